use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Beacon, BeaconInput, MapElement, MapElementInput, MapSettings, NewSector, NewUser, Product,
    ProductInput, Sector, Store, StoreInput, StoreMapConfig, User, UserSession, Wall, WallInput,
};

/// Read side consumed by the sector tree assembler.
///
/// Rows come back ordered by id ascending.
#[async_trait]
pub trait SectorSource: Send + Sync {
    /// Sectors of `store_id` whose parent is `parent_id` (`None` selects roots)
    async fn find_sectors(&self, store_id: i64, parent_id: Option<i64>) -> Result<Vec<Sector>, DatabaseError>;
    async fn find_products(&self, sector_id: i64) -> Result<Vec<Product>, DatabaseError>;
    async fn count_sectors(&self, store_id: i64) -> Result<i64, DatabaseError>;
    async fn list_store_sectors(&self, store_id: i64) -> Result<Vec<Sector>, DatabaseError>;
}

/// Flat storage of a store's layout.
///
/// Every listing returns rows ordered by id ascending so that tree assembly
/// and API listings are deterministic across backends.
///
/// Deletes cascade:
/// - a store takes its sectors, products, walls, beacons, map elements and map config;
/// - a sector takes its whole subtree of sectors and their products, and
///   clears `sector_id` on map elements pointing into the subtree;
/// - a beacon clears `beacon_id` on map elements pointing at it.
#[async_trait]
pub trait StoreRepository: SectorSource {
    /// Cheap round trip used by health checks
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Stores
    async fn list_stores(&self) -> Result<Vec<Store>, DatabaseError>;
    async fn count_stores(&self) -> Result<i64, DatabaseError>;
    async fn get_store(&self, id: i64) -> Result<Option<Store>, DatabaseError>;
    async fn create_store(&self, input: &StoreInput) -> Result<Store, DatabaseError>;
    async fn update_store(&self, id: i64, input: &StoreInput) -> Result<Store, DatabaseError>;
    async fn delete_store(&self, id: i64) -> Result<(), DatabaseError>;

    // Sectors
    async fn get_sector(&self, id: i64) -> Result<Option<Sector>, DatabaseError>;
    async fn create_sector(&self, sector: &NewSector) -> Result<Sector, DatabaseError>;
    async fn update_sector(&self, id: i64, sector: &NewSector) -> Result<Sector, DatabaseError>;
    async fn set_sector_level(&self, id: i64, level: i32) -> Result<(), DatabaseError>;
    async fn delete_sector(&self, id: i64) -> Result<(), DatabaseError>;

    // Products
    async fn get_product(&self, id: i64) -> Result<Option<Product>, DatabaseError>;
    async fn create_product(&self, sector_id: i64, input: &ProductInput) -> Result<Product, DatabaseError>;
    async fn update_product(&self, id: i64, input: &ProductInput) -> Result<Product, DatabaseError>;
    async fn delete_product(&self, id: i64) -> Result<(), DatabaseError>;
    /// Case-insensitive substring match on name or description; an empty
    /// query returns every product of the store
    async fn search_products(&self, store_id: i64, query: &str) -> Result<Vec<Product>, DatabaseError>;

    // Walls
    async fn list_walls(&self, store_id: i64) -> Result<Vec<Wall>, DatabaseError>;
    async fn create_wall(&self, store_id: i64, input: &WallInput) -> Result<Wall, DatabaseError>;
    async fn delete_wall(&self, id: i64) -> Result<(), DatabaseError>;

    // Beacons
    async fn list_beacons(&self, store_id: i64) -> Result<Vec<Beacon>, DatabaseError>;
    async fn get_beacon(&self, id: i64) -> Result<Option<Beacon>, DatabaseError>;
    async fn create_beacon(&self, input: &BeaconInput) -> Result<Beacon, DatabaseError>;
    async fn update_beacon(&self, id: i64, input: &BeaconInput) -> Result<Beacon, DatabaseError>;
    async fn delete_beacon(&self, id: i64) -> Result<(), DatabaseError>;

    // Map elements
    async fn list_map_elements(&self, store_id: i64) -> Result<Vec<MapElement>, DatabaseError>;
    async fn get_map_element(&self, id: i64) -> Result<Option<MapElement>, DatabaseError>;
    async fn create_map_element(&self, store_id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError>;
    async fn update_map_element(&self, id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError>;
    async fn delete_map_element(&self, id: i64) -> Result<(), DatabaseError>;

    // Map config
    async fn get_map_config(&self, store_id: i64) -> Result<Option<StoreMapConfig>, DatabaseError>;
    async fn upsert_map_config(&self, store_id: i64, settings: &MapSettings) -> Result<StoreMapConfig, DatabaseError>;
}

/// Users and login sessions.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError>;

    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSession, DatabaseError>;
    /// Session for `token_hash` that has not expired as of `now`
    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserSession>, DatabaseError>;
    async fn delete_session(&self, token_hash: &str) -> Result<(), DatabaseError>;
    /// Returns how many sessions were removed
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError>;
}
