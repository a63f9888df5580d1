use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A rectangular region of a store floor plan. Coordinates are store-local metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sector {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub description: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub level: i32,
    pub parent_id: Option<i64>,
}

/// Client payload for creating or replacing a sector.
///
/// `level` is accepted for compatibility with older editors but always
/// recomputed from the parent chain.
#[derive(Debug, Clone, Deserialize)]
pub struct SectorInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Fully resolved row handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewSector {
    pub store_id: i64,
    pub name: String,
    pub description: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub level: i32,
    pub parent_id: Option<i64>,
}

impl NewSector {
    pub fn from_input(store_id: i64, level: i32, input: SectorInput) -> Self {
        Self {
            store_id,
            name: input.name,
            description: input.description,
            position_x: input.position_x,
            position_y: input.position_y,
            width: input.width,
            height: input.height,
            level,
            parent_id: input.parent_id,
        }
    }

    pub fn into_sector(self, id: i64) -> Sector {
        Sector {
            id,
            store_id: self.store_id,
            name: self.name,
            description: self.description,
            position_x: self.position_x,
            position_y: self.position_y,
            width: self.width,
            height: self.height,
            level: self.level,
            parent_id: self.parent_id,
        }
    }
}
