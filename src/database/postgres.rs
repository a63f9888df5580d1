use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Beacon, BeaconInput, MapElement, MapElementInput, MapSettings, NewSector, NewUser, Product,
    ProductInput, Sector, Store, StoreInput, StoreMapConfig, User, UserSession, Wall, WallInput,
};
use crate::database::repository::{AuthRepository, SectorSource, StoreRepository};

const SECTOR_COLUMNS: &str =
    "id, store_id, name, description, position_x, position_y, width, height, level, parent_id";
const PRODUCT_COLUMNS: &str = "id, sector_id, name, description, price";
const WALL_COLUMNS: &str = "id, store_id, start_x, start_y, end_x, end_y, thickness";
const BEACON_COLUMNS: &str = "id, store_id, mac, position_x, position_y, position_z, beacon_type, \
     uuid, major, minor, tx_power, is_active";
const MAP_ELEMENT_COLUMNS: &str = "id, store_id, element_type, name, position_x, position_y, \
     width, height, rotation, color, metadata, sector_id, beacon_id";
const MAP_CONFIG_COLUMNS: &str = "id, store_id, real_width, real_height, map_width, map_height, \
     scale, origin_x, origin_y";
const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";
const SESSION_COLUMNS: &str = "id, user_id, token_hash, expires_at, created_at";

/// Turn a zero-row DELETE into `NotFound`
fn expect_affected(rows: u64, entity: &str, id: i64) -> Result<(), DatabaseError> {
    if rows == 0 {
        Err(DatabaseError::not_found(entity, id))
    } else {
        Ok(())
    }
}

/// Layout repository over the Postgres schema in `migrations/`.
///
/// Cascades are enforced by foreign keys (`ON DELETE CASCADE` and
/// `ON DELETE SET NULL`), so deletes here are single statements.
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectorSource for PgStoreRepository {
    async fn find_sectors(&self, store_id: i64, parent_id: Option<i64>) -> Result<Vec<Sector>, DatabaseError> {
        // IS NOT DISTINCT FROM matches NULL against NULL for root lookups
        let sql = format!(
            "SELECT {SECTOR_COLUMNS} FROM sectors \
             WHERE store_id = $1 AND parent_id IS NOT DISTINCT FROM $2 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Sector>(&sql)
            .bind(store_id)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_products(&self, sector_id: i64) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sector_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(sector_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_sectors(&self, store_id: i64) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sectors WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_store_sectors(&self, store_id: i64) -> Result<Vec<Sector>, DatabaseError> {
        let sql = format!("SELECT {SECTOR_COLUMNS} FROM sectors WHERE store_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Sector>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_stores(&self) -> Result<Vec<Store>, DatabaseError> {
        let rows = sqlx::query_as::<_, Store>("SELECT id, name, address FROM stores ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_stores(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_store(&self, id: i64) -> Result<Option<Store>, DatabaseError> {
        let row = sqlx::query_as::<_, Store>("SELECT id, name, address FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_store(&self, input: &StoreInput) -> Result<Store, DatabaseError> {
        let row = sqlx::query_as::<_, Store>(
            "INSERT INTO stores (name, address) VALUES ($1, $2) RETURNING id, name, address",
        )
        .bind(&input.name)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_store(&self, id: i64, input: &StoreInput) -> Result<Store, DatabaseError> {
        sqlx::query_as::<_, Store>(
            "UPDATE stores SET name = $2, address = $3 WHERE id = $1 RETURNING id, name, address",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Store", id))
    }

    async fn delete_store(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Store", id)
    }

    async fn get_sector(&self, id: i64) -> Result<Option<Sector>, DatabaseError> {
        let sql = format!("SELECT {SECTOR_COLUMNS} FROM sectors WHERE id = $1");
        let row = sqlx::query_as::<_, Sector>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_sector(&self, sector: &NewSector) -> Result<Sector, DatabaseError> {
        let sql = format!(
            "INSERT INTO sectors (store_id, name, description, position_x, position_y, width, height, level, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {SECTOR_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Sector>(&sql)
            .bind(sector.store_id)
            .bind(&sector.name)
            .bind(&sector.description)
            .bind(sector.position_x)
            .bind(sector.position_y)
            .bind(sector.width)
            .bind(sector.height)
            .bind(sector.level)
            .bind(sector.parent_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_sector(&self, id: i64, sector: &NewSector) -> Result<Sector, DatabaseError> {
        let sql = format!(
            "UPDATE sectors SET store_id = $2, name = $3, description = $4, position_x = $5, \
             position_y = $6, width = $7, height = $8, level = $9, parent_id = $10 \
             WHERE id = $1 RETURNING {SECTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Sector>(&sql)
            .bind(id)
            .bind(sector.store_id)
            .bind(&sector.name)
            .bind(&sector.description)
            .bind(sector.position_x)
            .bind(sector.position_y)
            .bind(sector.width)
            .bind(sector.height)
            .bind(sector.level)
            .bind(sector.parent_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Sector", id))
    }

    async fn set_sector_level(&self, id: i64, level: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE sectors SET level = $2 WHERE id = $1")
            .bind(id)
            .bind(level)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Sector", id)
    }

    async fn delete_sector(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM sectors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Sector", id)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_product(&self, sector_id: i64, input: &ProductInput) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO products (sector_id, name, description, price) VALUES ($1, $2, $3, $4) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(sector_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_product(&self, id: i64, input: &ProductInput) -> Result<Product, DatabaseError> {
        let sql = format!(
            "UPDATE products SET name = $2, description = $3, price = $4 WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Product", id))
    }

    async fn delete_product(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Product", id)
    }

    async fn search_products(&self, store_id: i64, query: &str) -> Result<Vec<Product>, DatabaseError> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let rows = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.sector_id, p.name, p.description, p.price \
             FROM products p JOIN sectors s ON s.id = p.sector_id \
             WHERE s.store_id = $1 AND (p.name ILIKE $2 OR p.description ILIKE $2) \
             ORDER BY p.id",
        )
        .bind(store_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_walls(&self, store_id: i64) -> Result<Vec<Wall>, DatabaseError> {
        let sql = format!("SELECT {WALL_COLUMNS} FROM walls WHERE store_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Wall>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_wall(&self, store_id: i64, input: &WallInput) -> Result<Wall, DatabaseError> {
        let sql = format!(
            "INSERT INTO walls (store_id, start_x, start_y, end_x, end_y, thickness) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {WALL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Wall>(&sql)
            .bind(store_id)
            .bind(input.start_x)
            .bind(input.start_y)
            .bind(input.end_x)
            .bind(input.end_y)
            .bind(input.thickness)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_wall(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM walls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Wall", id)
    }

    async fn list_beacons(&self, store_id: i64) -> Result<Vec<Beacon>, DatabaseError> {
        let sql = format!("SELECT {BEACON_COLUMNS} FROM beacons WHERE store_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Beacon>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_beacon(&self, id: i64) -> Result<Option<Beacon>, DatabaseError> {
        let sql = format!("SELECT {BEACON_COLUMNS} FROM beacons WHERE id = $1");
        let row = sqlx::query_as::<_, Beacon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_beacon(&self, input: &BeaconInput) -> Result<Beacon, DatabaseError> {
        let sql = format!(
            "INSERT INTO beacons (store_id, mac, position_x, position_y, position_z, beacon_type, \
             uuid, major, minor, tx_power, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {BEACON_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Beacon>(&sql)
            .bind(input.store_id)
            .bind(&input.mac)
            .bind(input.position_x)
            .bind(input.position_y)
            .bind(input.position_z)
            .bind(&input.beacon_type)
            .bind(&input.uuid)
            .bind(i32::from(input.major))
            .bind(i32::from(input.minor))
            .bind(i16::from(input.tx_power))
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_beacon(&self, id: i64, input: &BeaconInput) -> Result<Beacon, DatabaseError> {
        let sql = format!(
            "UPDATE beacons SET store_id = $2, mac = $3, position_x = $4, position_y = $5, \
             position_z = $6, beacon_type = $7, uuid = $8, major = $9, minor = $10, \
             tx_power = $11, is_active = $12 WHERE id = $1 RETURNING {BEACON_COLUMNS}"
        );
        sqlx::query_as::<_, Beacon>(&sql)
            .bind(id)
            .bind(input.store_id)
            .bind(&input.mac)
            .bind(input.position_x)
            .bind(input.position_y)
            .bind(input.position_z)
            .bind(&input.beacon_type)
            .bind(&input.uuid)
            .bind(i32::from(input.major))
            .bind(i32::from(input.minor))
            .bind(i16::from(input.tx_power))
            .bind(input.is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Beacon", id))
    }

    async fn delete_beacon(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM beacons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Beacon", id)
    }

    async fn list_map_elements(&self, store_id: i64) -> Result<Vec<MapElement>, DatabaseError> {
        let sql = format!("SELECT {MAP_ELEMENT_COLUMNS} FROM map_elements WHERE store_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, MapElement>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_map_element(&self, id: i64) -> Result<Option<MapElement>, DatabaseError> {
        let sql = format!("SELECT {MAP_ELEMENT_COLUMNS} FROM map_elements WHERE id = $1");
        let row = sqlx::query_as::<_, MapElement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_map_element(&self, store_id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError> {
        let sql = format!(
            "INSERT INTO map_elements (store_id, element_type, name, position_x, position_y, width, \
             height, rotation, color, metadata, sector_id, beacon_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {MAP_ELEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MapElement>(&sql)
            .bind(store_id)
            .bind(&input.element_type)
            .bind(&input.name)
            .bind(input.position_x)
            .bind(input.position_y)
            .bind(input.width)
            .bind(input.height)
            .bind(input.rotation)
            .bind(&input.color)
            .bind(&input.metadata)
            .bind(input.sector_id)
            .bind(input.beacon_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_map_element(&self, id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError> {
        let sql = format!(
            "UPDATE map_elements SET element_type = $2, name = $3, position_x = $4, position_y = $5, \
             width = $6, height = $7, rotation = $8, color = $9, metadata = $10, sector_id = $11, \
             beacon_id = $12 WHERE id = $1 RETURNING {MAP_ELEMENT_COLUMNS}"
        );
        sqlx::query_as::<_, MapElement>(&sql)
            .bind(id)
            .bind(&input.element_type)
            .bind(&input.name)
            .bind(input.position_x)
            .bind(input.position_y)
            .bind(input.width)
            .bind(input.height)
            .bind(input.rotation)
            .bind(&input.color)
            .bind(&input.metadata)
            .bind(input.sector_id)
            .bind(input.beacon_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Map element", id))
    }

    async fn delete_map_element(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM map_elements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "Map element", id)
    }

    async fn get_map_config(&self, store_id: i64) -> Result<Option<StoreMapConfig>, DatabaseError> {
        let sql = format!("SELECT {MAP_CONFIG_COLUMNS} FROM store_map_configs WHERE store_id = $1");
        let row = sqlx::query_as::<_, StoreMapConfig>(&sql)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_map_config(&self, store_id: i64, settings: &MapSettings) -> Result<StoreMapConfig, DatabaseError> {
        let sql = format!(
            "INSERT INTO store_map_configs (store_id, real_width, real_height, map_width, map_height, \
             scale, origin_x, origin_y) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (store_id) DO UPDATE SET real_width = EXCLUDED.real_width, \
             real_height = EXCLUDED.real_height, map_width = EXCLUDED.map_width, \
             map_height = EXCLUDED.map_height, scale = EXCLUDED.scale, \
             origin_x = EXCLUDED.origin_x, origin_y = EXCLUDED.origin_y \
             RETURNING {MAP_CONFIG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StoreMapConfig>(&sql)
            .bind(store_id)
            .bind(settings.real_width)
            .bind(settings.real_height)
            .bind(settings.map_width)
            .bind(settings.map_height)
            .bind(settings.scale)
            .bind(settings.origin_x)
            .bind(settings.origin_y)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Users and sessions over Postgres.
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSession, DatabaseError> {
        let sql = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3) \
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserSession>(&sql)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserSession>, DatabaseError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE token_hash = $1 AND expires_at > $2"
        );
        let row = sqlx::query_as::<_, UserSession>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("milk"), "milk");
    }

    #[test]
    fn zero_rows_is_not_found() {
        assert!(matches!(expect_affected(0, "Wall", 3), Err(DatabaseError::NotFound(_))));
        assert!(expect_affected(1, "Wall", 3).is_ok());
    }
}
