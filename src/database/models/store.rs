use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Body of `POST /api/admin/stores` and `PUT /api/admin/stores/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct StoreInput {
    pub name: String,
    #[serde(default)]
    pub address: String,
}
