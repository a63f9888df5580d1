use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Generic renderable shape (cashier, entrance, passage, ...) placed on a store map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MapElement {
    pub id: i64,
    pub store_id: i64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub color: String,
    pub metadata: Value,
    pub sector_id: Option<i64>,
    pub beacon_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapElementInput {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    #[serde(default)]
    pub sector_id: Option<i64>,
    #[serde(default)]
    pub beacon_id: Option<i64>,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}
