use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use store_navigator::config::{AppConfig, StorageBackend};
use store_navigator::database::{
    AuthRepository, DatabaseManager, MemoryStore, PgAuthRepository, PgStoreRepository, StoreRepository,
};
use store_navigator::routes;
use store_navigator::services::{seed_demo_data, MemoryQueueCache, QueueCache, RedisQueueCache};
use store_navigator::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, REDIS_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("store_navigator=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!("Starting Store Navigator in {:?} mode", config.environment);

    let (store, auth, pool) = match config.server.backend {
        StorageBackend::Postgres => {
            let db = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                db.migrate().await?;
            }
            let store: Arc<dyn StoreRepository> = Arc::new(PgStoreRepository::new(db.pool().clone()));
            let auth: Arc<dyn AuthRepository> = Arc::new(PgAuthRepository::new(db.pool().clone()));
            (store, auth, Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory backend; data is lost on restart");
            let memory = Arc::new(MemoryStore::new());
            let store: Arc<dyn StoreRepository> = memory.clone();
            let auth: Arc<dyn AuthRepository> = memory;
            (store, auth, None)
        }
    };

    let queues: Arc<dyn QueueCache> = match config.cache.redis_url.as_deref() {
        Some(url) => Arc::new(
            RedisQueueCache::connect(url, config.queue_ttl())
                .await
                .context("failed to connect to Redis")?,
        ),
        None => {
            info!("REDIS_URL not set; queue lengths are kept in memory");
            Arc::new(MemoryQueueCache::new(config.queue_ttl()))
        }
    };

    if config.server.seed_demo_data {
        seed_demo_data(store.as_ref()).await.context("failed to seed demo data")?;
    }

    let bind_addr = config.bind_addr();
    let bootstrap_admin = config.security.bootstrap_admin.clone();
    let state = AppState::new(config, store, auth, queues);

    if let Some(admin) = bootstrap_admin {
        state.auth_service().ensure_admin(&admin).await?;
    }

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Store Navigator listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = pool {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
