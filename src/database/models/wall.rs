use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_WALL_THICKNESS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Wall {
    pub id: i64,
    pub store_id: i64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub thickness: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WallInput {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
}

fn default_thickness() -> f64 {
    DEFAULT_WALL_THICKNESS
}
