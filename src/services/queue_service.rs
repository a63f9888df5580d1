use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("{0}")]
    Validation(String),

    #[error("Queue cache unavailable: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt queue entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Body of `POST /api/stores/:id/queues`
#[derive(Debug, Clone, Deserialize)]
pub struct QueueUpdate {
    pub checkout_number: i64,
    pub people_count: i64,
}

impl QueueUpdate {
    /// Checkout numbers start at 1; people counts are non-negative
    pub fn validate(&self) -> Result<(u32, u32), QueueError> {
        let checkout = u32::try_from(self.checkout_number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| QueueError::Validation("checkout_number must be a positive integer".to_string()))?;
        let people = u32::try_from(self.people_count)
            .map_err(|_| QueueError::Validation("people_count must not be negative".to_string()))?;
        Ok((checkout, people))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub people_count: u32,
    pub updated_at: DateTime<Utc>,
}

/// Per-checkout people counts that expire on their own.
#[async_trait]
pub trait QueueCache: Send + Sync {
    async fn update_queue(&self, store_id: i64, checkout_number: u32, people_count: u32) -> Result<QueueEntry, QueueError>;

    /// Live entries keyed by checkout number
    async fn get_queues(&self, store_id: i64) -> Result<BTreeMap<u32, QueueEntry>, QueueError>;
}

fn queue_key(store_id: i64, checkout_number: u32) -> String {
    format!("store:{store_id}:queue:{checkout_number}")
}

fn index_key(store_id: i64) -> String {
    format!("store:{store_id}:queues")
}

/// Redis-backed queue cache.
///
/// Each checkout lives under `store:{id}:queue:{n}` with a TTL; the set
/// `store:{id}:queues` indexes the checkout numbers so reads avoid `KEYS`.
#[derive(Clone)]
pub struct RedisQueueCache {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisQueueCache {
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, QueueError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected queue cache to Redis");
        Ok(Self { conn, ttl })
    }
}

#[async_trait]
impl QueueCache for RedisQueueCache {
    async fn update_queue(&self, store_id: i64, checkout_number: u32, people_count: u32) -> Result<QueueEntry, QueueError> {
        let entry = QueueEntry {
            people_count,
            updated_at: Utc::now(),
        };
        let payload = serde_json::to_string(&entry)?;
        let ttl = self.ttl.as_secs().max(1);
        let index = index_key(store_id);

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(queue_key(store_id, checkout_number), payload, ttl).await?;
        let _: () = conn.sadd(&index, checkout_number).await?;
        let _: () = conn.expire(&index, ttl as i64).await?;
        debug!("Queue {} of store {} set to {}", checkout_number, store_id, people_count);
        Ok(entry)
    }

    async fn get_queues(&self, store_id: i64) -> Result<BTreeMap<u32, QueueEntry>, QueueError> {
        let index = index_key(store_id);
        let mut conn = self.conn.clone();
        let checkouts: Vec<u32> = conn.smembers(&index).await?;
        if checkouts.is_empty() {
            return Ok(BTreeMap::new());
        }

        let keys: Vec<String> = checkouts.iter().map(|n| queue_key(store_id, *n)).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let mut queues = BTreeMap::new();
        let mut expired = Vec::new();
        for (checkout, value) in checkouts.into_iter().zip(values) {
            match value {
                Some(raw) => {
                    queues.insert(checkout, serde_json::from_str(&raw)?);
                }
                None => expired.push(checkout),
            }
        }
        if !expired.is_empty() {
            let _: () = conn.srem(&index, expired).await?;
        }
        Ok(queues)
    }
}

/// Process-local queue cache used when no Redis URL is configured.
pub struct MemoryQueueCache {
    ttl: Duration,
    entries: Mutex<HashMap<(i64, u32), (QueueEntry, Instant)>>,
}

impl MemoryQueueCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl QueueCache for MemoryQueueCache {
    async fn update_queue(&self, store_id: i64, checkout_number: u32, people_count: u32) -> Result<QueueEntry, QueueError> {
        let entry = QueueEntry {
            people_count,
            updated_at: Utc::now(),
        };
        let mut entries = self.entries.lock().await;
        entries.insert((store_id, checkout_number), (entry.clone(), Instant::now() + self.ttl));
        Ok(entry)
    }

    async fn get_queues(&self, store_id: i64) -> Result<BTreeMap<u32, QueueEntry>, QueueError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(entries
            .iter()
            .filter(|((store, _), _)| *store == store_id)
            .map(|((_, checkout), (entry, _))| (*checkout, entry.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_store_layout() {
        assert_eq!(queue_key(3, 2), "store:3:queue:2");
        assert_eq!(index_key(3), "store:3:queues");
    }

    #[test]
    fn update_validation() {
        let ok = QueueUpdate { checkout_number: 2, people_count: 0 };
        assert_eq!(ok.validate().unwrap(), (2, 0));
        assert!(QueueUpdate { checkout_number: 0, people_count: 1 }.validate().is_err());
        assert!(QueueUpdate { checkout_number: 1, people_count: -1 }.validate().is_err());
    }

    #[tokio::test]
    async fn memory_cache_overwrites_and_scopes_by_store() {
        let cache = MemoryQueueCache::new(Duration::from_secs(600));
        cache.update_queue(1, 1, 3).await.unwrap();
        cache.update_queue(1, 2, 5).await.unwrap();
        cache.update_queue(1, 1, 4).await.unwrap();
        cache.update_queue(2, 1, 9).await.unwrap();

        let queues = cache.get_queues(1).await.unwrap();
        assert_eq!(queues.len(), 2);
        assert_eq!(queues[&1].people_count, 4);
        assert_eq!(queues[&2].people_count, 5);
        assert!(cache.get_queues(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_cache_entries_expire() {
        let cache = MemoryQueueCache::new(Duration::from_millis(50));
        cache.update_queue(1, 1, 3).await.unwrap();
        assert_eq!(cache.get_queues(1).await.unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get_queues(1).await.unwrap().is_empty());
    }
}
