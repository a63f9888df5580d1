use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Real-world to pixel mapping used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MapSettings {
    pub real_width: f64,
    pub real_height: f64,
    pub map_width: f64,
    pub map_height: f64,
    /// Pixels per metre
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            real_width: 50.0,
            real_height: 30.0,
            map_width: 1200.0,
            map_height: 800.0,
            scale: 20.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoreMapConfig {
    pub id: i64,
    pub store_id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub settings: MapSettings,
}

/// Map config as served to clients; `is_default` marks the fallback for stores without a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfigResponse {
    pub store_id: i64,
    pub is_default: bool,
    #[serde(flatten)]
    pub settings: MapSettings,
}

impl MapConfigResponse {
    pub fn resolve(store_id: i64, stored: Option<StoreMapConfig>) -> Self {
        match stored {
            Some(config) => Self {
                store_id,
                is_default: false,
                settings: config.settings,
            },
            None => Self {
                store_id,
                is_default: true,
                settings: MapSettings::default(),
            },
        }
    }
}
