use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// BLE beacon installed in a store. `major`/`minor` hold u16 values and
/// `tx_power` an i8; Postgres has no unsigned types so they widen here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Beacon {
    pub id: i64,
    pub store_id: i64,
    pub mac: String,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    #[serde(rename = "type")]
    pub beacon_type: String,
    pub uuid: String,
    pub major: i32,
    pub minor: i32,
    pub tx_power: i16,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeaconInput {
    pub store_id: i64,
    pub mac: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub position_z: f64,
    #[serde(rename = "type", default = "default_beacon_type")]
    pub beacon_type: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub major: u16,
    #[serde(default)]
    pub minor: u16,
    #[serde(default)]
    pub tx_power: i8,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_beacon_type() -> String {
    "ibeacon".to_string()
}

fn default_active() -> bool {
    true
}
