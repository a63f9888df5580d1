use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::models::{NewSector, Product, ProductInput, Sector, StoreInput};
use crate::database::{DatabaseError, MemoryStore, SectorSource, StoreRepository};
use crate::services::queue_service::MemoryQueueCache;
use crate::state::AppState;

/// Create a store and return its id
pub async fn seeded_store(repo: &Arc<MemoryStore>, name: &str) -> i64 {
    repo.create_store(&StoreInput {
        name: name.to_string(),
        address: String::new(),
    })
    .await
    .expect("create store")
    .id
}

/// Sector row ready for `create_sector`, 1x1 at the origin
pub fn sector_under(store_id: i64, parent_id: Option<i64>, level: i32, name: &str) -> NewSector {
    NewSector {
        store_id,
        name: name.to_string(),
        description: format!("{name} sector"),
        position_x: 0.0,
        position_y: 0.0,
        width: 1.0,
        height: 1.0,
        level,
        parent_id,
    }
}

/// Sector with a fixed id, for `MemoryStore::insert_raw_sector`
pub fn raw_sector(id: i64, store_id: i64, parent_id: Option<i64>, level: i32) -> Sector {
    sector_under(store_id, parent_id, level, &format!("S{id}")).into_sector(id)
}

pub fn product_input(name: &str, price: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: String::new(),
        price: Decimal::from_str(price).expect("decimal price"),
    }
}

/// App state over a fresh in-memory store and queue cache
pub fn memory_state() -> (AppState, Arc<MemoryStore>) {
    let config = AppConfig::for_tests();
    let store = Arc::new(MemoryStore::new());
    let queues = Arc::new(MemoryQueueCache::new(config.queue_ttl()));
    let state = AppState::new(config, store.clone(), store.clone(), queues);
    (state, store)
}

/// Sector source whose child query for sector 2 hands back its own
/// ancestor, sector 1. A parent-pointer table cannot express this, so it
/// stands in for a misbehaving backend.
pub struct LoopingSource;

impl LoopingSource {
    pub const STORE_ID: i64 = 1;

    pub fn new() -> Self {
        Self
    }

    fn sector(id: i64, parent_id: Option<i64>) -> Sector {
        raw_sector(id, Self::STORE_ID, parent_id, 0)
    }
}

#[async_trait]
impl SectorSource for LoopingSource {
    async fn find_sectors(&self, _store_id: i64, parent_id: Option<i64>) -> Result<Vec<Sector>, DatabaseError> {
        Ok(match parent_id {
            None => vec![Self::sector(1, None)],
            Some(1) => vec![Self::sector(2, Some(1))],
            Some(2) => vec![Self::sector(1, Some(2))],
            Some(_) => Vec::new(),
        })
    }

    async fn find_products(&self, _sector_id: i64) -> Result<Vec<Product>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn count_sectors(&self, _store_id: i64) -> Result<i64, DatabaseError> {
        Ok(2)
    }

    async fn list_store_sectors(&self, _store_id: i64) -> Result<Vec<Sector>, DatabaseError> {
        Ok(vec![Self::sector(1, None), Self::sector(2, Some(1))])
    }
}
