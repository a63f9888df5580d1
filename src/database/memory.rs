use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Beacon, BeaconInput, MapElement, MapElementInput, MapSettings, NewSector, NewUser, Product,
    ProductInput, Sector, Store, StoreInput, StoreMapConfig, User, UserSession, Wall, WallInput,
};
use crate::database::repository::{AuthRepository, SectorSource, StoreRepository};

#[derive(Default)]
struct Tables {
    next_id: i64,
    stores: BTreeMap<i64, Store>,
    sectors: BTreeMap<i64, Sector>,
    products: BTreeMap<i64, Product>,
    walls: BTreeMap<i64, Wall>,
    beacons: BTreeMap<i64, Beacon>,
    map_elements: BTreeMap<i64, MapElement>,
    map_configs: BTreeMap<i64, StoreMapConfig>,
    users: BTreeMap<i64, User>,
    sessions: BTreeMap<i64, UserSession>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// `root` plus every sector below it
    fn subtree_ids(&self, root: i64) -> BTreeSet<i64> {
        let mut ids = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !ids.insert(id) {
                continue;
            }
            stack.extend(
                self.sectors
                    .values()
                    .filter(|s| s.parent_id == Some(id))
                    .map(|s| s.id),
            );
        }
        ids
    }

    fn remove_sectors(&mut self, ids: &BTreeSet<i64>) {
        self.sectors.retain(|id, _| !ids.contains(id));
        self.products.retain(|_, p| !ids.contains(&p.sector_id));
        for element in self.map_elements.values_mut() {
            if element.sector_id.is_some_and(|sid| ids.contains(&sid)) {
                element.sector_id = None;
            }
        }
    }

    fn ensure_store(&self, store_id: i64) -> Result<(), DatabaseError> {
        if self.stores.contains_key(&store_id) {
            Ok(())
        } else {
            Err(DatabaseError::not_found("Store", store_id))
        }
    }

    fn ensure_unique_mac(&self, mac: &str, except: Option<i64>) -> Result<(), DatabaseError> {
        let wanted = mac.to_lowercase();
        let taken = self
            .beacons
            .values()
            .any(|b| b.mac.to_lowercase() == wanted && Some(b.id) != except);
        if taken {
            return Err(DatabaseError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_beacons_mac ({mac})"
            )));
        }
        Ok(())
    }
}

/// Process-local implementation of both repositories.
///
/// Mirrors the Postgres schema's constraints (foreign keys, unique MAC and
/// username, cascades) so handlers behave the same against either backend.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sector row verbatim, bypassing parent validation.
    ///
    /// Lets tests reproduce corrupted hierarchies (cycles, dangling parents)
    /// that the write path would reject.
    pub async fn insert_raw_sector(&self, sector: Sector) {
        let mut tables = self.tables.write().await;
        tables.next_id = tables.next_id.max(sector.id);
        tables.sectors.insert(sector.id, sector);
    }
}

fn beacon_from_input(id: i64, input: &BeaconInput) -> Beacon {
    Beacon {
        id,
        store_id: input.store_id,
        mac: input.mac.clone(),
        position_x: input.position_x,
        position_y: input.position_y,
        position_z: input.position_z,
        beacon_type: input.beacon_type.clone(),
        uuid: input.uuid.clone(),
        major: i32::from(input.major),
        minor: i32::from(input.minor),
        tx_power: i16::from(input.tx_power),
        is_active: input.is_active,
    }
}

fn map_element_from_input(id: i64, store_id: i64, input: &MapElementInput) -> MapElement {
    MapElement {
        id,
        store_id,
        element_type: input.element_type.clone(),
        name: input.name.clone(),
        position_x: input.position_x,
        position_y: input.position_y,
        width: input.width,
        height: input.height,
        rotation: input.rotation,
        color: input.color.clone(),
        metadata: input.metadata.clone(),
        sector_id: input.sector_id,
        beacon_id: input.beacon_id,
    }
}

#[async_trait]
impl SectorSource for MemoryStore {
    async fn find_sectors(&self, store_id: i64, parent_id: Option<i64>) -> Result<Vec<Sector>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sectors
            .values()
            .filter(|s| s.store_id == store_id && s.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn find_products(&self, sector_id: i64) -> Result<Vec<Product>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.sector_id == sector_id)
            .cloned()
            .collect())
    }

    async fn count_sectors(&self, store_id: i64) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.sectors.values().filter(|s| s.store_id == store_id).count() as i64)
    }

    async fn list_store_sectors(&self, store_id: i64) -> Result<Vec<Sector>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sectors
            .values()
            .filter(|s| s.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreRepository for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_stores(&self) -> Result<Vec<Store>, DatabaseError> {
        Ok(self.tables.read().await.stores.values().cloned().collect())
    }

    async fn count_stores(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.stores.len() as i64)
    }

    async fn get_store(&self, id: i64) -> Result<Option<Store>, DatabaseError> {
        Ok(self.tables.read().await.stores.get(&id).cloned())
    }

    async fn create_store(&self, input: &StoreInput) -> Result<Store, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        let store = Store {
            id,
            name: input.name.clone(),
            address: input.address.clone(),
        };
        tables.stores.insert(id, store.clone());
        Ok(store)
    }

    async fn update_store(&self, id: i64, input: &StoreInput) -> Result<Store, DatabaseError> {
        let mut tables = self.tables.write().await;
        let store = tables
            .stores
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Store", id))?;
        store.name = input.name.clone();
        store.address = input.address.clone();
        Ok(store.clone())
    }

    async fn delete_store(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.stores.remove(&id).is_none() {
            return Err(DatabaseError::not_found("Store", id));
        }
        let sector_ids: BTreeSet<i64> = tables
            .sectors
            .values()
            .filter(|s| s.store_id == id)
            .map(|s| s.id)
            .collect();
        tables.remove_sectors(&sector_ids);
        tables.walls.retain(|_, w| w.store_id != id);
        tables.beacons.retain(|_, b| b.store_id != id);
        tables.map_elements.retain(|_, e| e.store_id != id);
        tables.map_configs.retain(|_, c| c.store_id != id);
        Ok(())
    }

    async fn get_sector(&self, id: i64) -> Result<Option<Sector>, DatabaseError> {
        Ok(self.tables.read().await.sectors.get(&id).cloned())
    }

    async fn create_sector(&self, sector: &NewSector) -> Result<Sector, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.ensure_store(sector.store_id)?;
        if let Some(parent_id) = sector.parent_id {
            if !tables.sectors.contains_key(&parent_id) {
                return Err(DatabaseError::not_found("Sector", parent_id));
            }
        }
        let id = tables.allocate_id();
        let created = sector.clone().into_sector(id);
        tables.sectors.insert(id, created.clone());
        Ok(created)
    }

    async fn update_sector(&self, id: i64, sector: &NewSector) -> Result<Sector, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.sectors.contains_key(&id) {
            return Err(DatabaseError::not_found("Sector", id));
        }
        if let Some(parent_id) = sector.parent_id {
            if !tables.sectors.contains_key(&parent_id) {
                return Err(DatabaseError::not_found("Sector", parent_id));
            }
        }
        let updated = sector.clone().into_sector(id);
        tables.sectors.insert(id, updated.clone());
        Ok(updated)
    }

    async fn set_sector_level(&self, id: i64, level: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let sector = tables
            .sectors
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Sector", id))?;
        sector.level = level;
        Ok(())
    }

    async fn delete_sector(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.sectors.contains_key(&id) {
            return Err(DatabaseError::not_found("Sector", id));
        }
        let ids = tables.subtree_ids(id);
        tables.remove_sectors(&ids);
        Ok(())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn create_product(&self, sector_id: i64, input: &ProductInput) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.sectors.contains_key(&sector_id) {
            return Err(DatabaseError::not_found("Sector", sector_id));
        }
        let id = tables.allocate_id();
        let product = Product {
            id,
            sector_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, input: &ProductInput) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Product", id))?;
        product.name = input.name.clone();
        product.description = input.description.clone();
        product.price = input.price;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Product", id))
    }

    async fn search_products(&self, store_id: i64, query: &str) -> Result<Vec<Product>, DatabaseError> {
        let tables = self.tables.read().await;
        let needle = query.trim().to_lowercase();
        let sector_ids: BTreeSet<i64> = tables
            .sectors
            .values()
            .filter(|s| s.store_id == store_id)
            .map(|s| s.id)
            .collect();
        Ok(tables
            .products
            .values()
            .filter(|p| sector_ids.contains(&p.sector_id))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn list_walls(&self, store_id: i64) -> Result<Vec<Wall>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.walls.values().filter(|w| w.store_id == store_id).cloned().collect())
    }

    async fn create_wall(&self, store_id: i64, input: &WallInput) -> Result<Wall, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.ensure_store(store_id)?;
        let id = tables.allocate_id();
        let wall = Wall {
            id,
            store_id,
            start_x: input.start_x,
            start_y: input.start_y,
            end_x: input.end_x,
            end_y: input.end_y,
            thickness: input.thickness,
        };
        tables.walls.insert(id, wall.clone());
        Ok(wall)
    }

    async fn delete_wall(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .walls
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Wall", id))
    }

    async fn list_beacons(&self, store_id: i64) -> Result<Vec<Beacon>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.beacons.values().filter(|b| b.store_id == store_id).cloned().collect())
    }

    async fn get_beacon(&self, id: i64) -> Result<Option<Beacon>, DatabaseError> {
        Ok(self.tables.read().await.beacons.get(&id).cloned())
    }

    async fn create_beacon(&self, input: &BeaconInput) -> Result<Beacon, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.ensure_store(input.store_id)?;
        tables.ensure_unique_mac(&input.mac, None)?;
        let id = tables.allocate_id();
        let beacon = beacon_from_input(id, input);
        tables.beacons.insert(id, beacon.clone());
        Ok(beacon)
    }

    async fn update_beacon(&self, id: i64, input: &BeaconInput) -> Result<Beacon, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.beacons.contains_key(&id) {
            return Err(DatabaseError::not_found("Beacon", id));
        }
        tables.ensure_store(input.store_id)?;
        tables.ensure_unique_mac(&input.mac, Some(id))?;
        let beacon = beacon_from_input(id, input);
        tables.beacons.insert(id, beacon.clone());
        Ok(beacon)
    }

    async fn delete_beacon(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.beacons.remove(&id).is_none() {
            return Err(DatabaseError::not_found("Beacon", id));
        }
        for element in tables.map_elements.values_mut() {
            if element.beacon_id == Some(id) {
                element.beacon_id = None;
            }
        }
        Ok(())
    }

    async fn list_map_elements(&self, store_id: i64) -> Result<Vec<MapElement>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .map_elements
            .values()
            .filter(|e| e.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn get_map_element(&self, id: i64) -> Result<Option<MapElement>, DatabaseError> {
        Ok(self.tables.read().await.map_elements.get(&id).cloned())
    }

    async fn create_map_element(&self, store_id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.ensure_store(store_id)?;
        let id = tables.allocate_id();
        let element = map_element_from_input(id, store_id, input);
        tables.map_elements.insert(id, element.clone());
        Ok(element)
    }

    async fn update_map_element(&self, id: i64, input: &MapElementInput) -> Result<MapElement, DatabaseError> {
        let mut tables = self.tables.write().await;
        let store_id = tables
            .map_elements
            .get(&id)
            .map(|e| e.store_id)
            .ok_or_else(|| DatabaseError::not_found("Map element", id))?;
        let element = map_element_from_input(id, store_id, input);
        tables.map_elements.insert(id, element.clone());
        Ok(element)
    }

    async fn delete_map_element(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .map_elements
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Map element", id))
    }

    async fn get_map_config(&self, store_id: i64) -> Result<Option<StoreMapConfig>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.map_configs.values().find(|c| c.store_id == store_id).cloned())
    }

    async fn upsert_map_config(&self, store_id: i64, settings: &MapSettings) -> Result<StoreMapConfig, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.ensure_store(store_id)?;
        let existing = tables
            .map_configs
            .values()
            .find(|c| c.store_id == store_id)
            .map(|c| c.id);
        let id = match existing {
            Some(id) => id,
            None => tables.allocate_id(),
        };
        let config = StoreMapConfig {
            id,
            store_id,
            settings: *settings,
        };
        tables.map_configs.insert(id, config.clone());
        Ok(config)
    }
}

#[async_trait]
impl AuthRepository for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_users_username ({})",
                user.username
            )));
        }
        let id = tables.allocate_id();
        let created = User {
            id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSession, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::not_found("User", user_id));
        }
        let id = tables.allocate_id();
        let session = UserSession {
            id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserSession>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .find(|s| s.token_hash == token_hash && !s.is_expired(now))
            .cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.sessions.retain(|_, s| s.token_hash != token_hash);
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product_input, sector_under};

    #[tokio::test]
    async fn deleting_a_sector_removes_its_whole_subtree() {
        let repo = MemoryStore::new();
        let store = repo
            .create_store(&StoreInput { name: "Test".into(), address: String::new() })
            .await
            .unwrap();
        let root = repo.create_sector(&sector_under(store.id, None, 0, "Root")).await.unwrap();
        let child = repo.create_sector(&sector_under(store.id, Some(root.id), 1, "Child")).await.unwrap();
        let grandchild = repo
            .create_sector(&sector_under(store.id, Some(child.id), 2, "Grandchild"))
            .await
            .unwrap();
        let sibling = repo.create_sector(&sector_under(store.id, None, 0, "Sibling")).await.unwrap();
        repo.create_product(grandchild.id, &product_input("Deep", "1.00")).await.unwrap();
        let kept = repo.create_product(sibling.id, &product_input("Kept", "2.00")).await.unwrap();

        repo.delete_sector(child.id).await.unwrap();

        assert!(repo.get_sector(root.id).await.unwrap().is_some());
        assert!(repo.get_sector(child.id).await.unwrap().is_none());
        assert!(repo.get_sector(grandchild.id).await.unwrap().is_none());
        assert!(repo.find_products(grandchild.id).await.unwrap().is_empty());
        assert_eq!(repo.search_products(store.id, "").await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn deleting_a_store_cascades_to_layout_records() {
        let repo = MemoryStore::new();
        let store = repo
            .create_store(&StoreInput { name: "Gone".into(), address: String::new() })
            .await
            .unwrap();
        let other = repo
            .create_store(&StoreInput { name: "Stays".into(), address: String::new() })
            .await
            .unwrap();
        let sector = repo.create_sector(&sector_under(store.id, None, 0, "Root")).await.unwrap();
        repo.create_product(sector.id, &product_input("Milk", "85.50")).await.unwrap();
        repo.create_wall(
            store.id,
            &WallInput { start_x: 0.0, start_y: 0.0, end_x: 1.0, end_y: 0.0, thickness: 0.1 },
        )
        .await
        .unwrap();
        repo.upsert_map_config(store.id, &MapSettings::default()).await.unwrap();
        let other_sector = repo.create_sector(&sector_under(other.id, None, 0, "Other")).await.unwrap();

        repo.delete_store(store.id).await.unwrap();

        assert!(repo.get_store(store.id).await.unwrap().is_none());
        assert_eq!(repo.count_sectors(store.id).await.unwrap(), 0);
        assert!(repo.list_walls(store.id).await.unwrap().is_empty());
        assert!(repo.get_map_config(store.id).await.unwrap().is_none());
        assert!(repo.get_sector(other_sector.id).await.unwrap().is_some());
        assert!(matches!(repo.delete_store(store.id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn beacon_mac_is_unique() {
        let repo = MemoryStore::new();
        let store = repo
            .create_store(&StoreInput { name: "Beacons".into(), address: String::new() })
            .await
            .unwrap();
        let input: BeaconInput = serde_json::from_value(serde_json::json!({
            "store_id": store.id,
            "mac": "AA:BB:CC:DD:EE:FF",
        }))
        .unwrap();
        let first = repo.create_beacon(&input).await.unwrap();
        assert!(first.is_active);
        assert_eq!(first.beacon_type, "ibeacon");
        assert!(matches!(repo.create_beacon(&input).await, Err(DatabaseError::Conflict(_))));
        // updating a beacon with its own MAC is fine
        repo.update_beacon(first.id, &input).await.unwrap();
    }

    #[tokio::test]
    async fn beacon_mac_comparison_folds_unicode_case() {
        let repo = MemoryStore::new();
        let store = repo
            .create_store(&StoreInput { name: "Beacons".into(), address: String::new() })
            .await
            .unwrap();
        let beacon = |mac: &str| -> BeaconInput {
            serde_json::from_value(serde_json::json!({ "store_id": store.id, "mac": mac })).unwrap()
        };
        repo.create_beacon(&beacon("ÄB-01")).await.unwrap();
        assert!(matches!(repo.create_beacon(&beacon("äb-01")).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn map_config_upsert_keeps_one_row_per_store() {
        let repo = MemoryStore::new();
        let store = repo
            .create_store(&StoreInput { name: "Cfg".into(), address: String::new() })
            .await
            .unwrap();
        let first = repo.upsert_map_config(store.id, &MapSettings::default()).await.unwrap();
        let wider = MapSettings { real_width: 80.0, ..MapSettings::default() };
        let second = repo.upsert_map_config(store.id, &wider).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.get_map_config(store.id).await.unwrap().unwrap().settings.real_width, 80.0);
    }

    #[tokio::test]
    async fn expired_sessions_are_not_returned() {
        let repo = MemoryStore::new();
        let user = repo
            .create_user(&NewUser {
                username: "clerk".into(),
                password_hash: "x".into(),
                role: crate::database::models::UserRole::User,
            })
            .await
            .unwrap();
        let now = Utc::now();
        repo.create_session(user.id, "live", now + chrono::Duration::hours(1)).await.unwrap();
        repo.create_session(user.id, "stale", now - chrono::Duration::seconds(1)).await.unwrap();

        assert!(repo.find_active_session("live", now).await.unwrap().is_some());
        assert!(repo.find_active_session("stale", now).await.unwrap().is_none());
        assert_eq!(repo.purge_expired_sessions(now).await.unwrap(), 1);
    }
}
