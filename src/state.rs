use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{AuthRepository, StoreRepository};
use crate::services::{AuthService, QueueCache, SectorService, SectorTreeAssembler};

/// Shared state handed to every handler via `State<AppState>`.
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn StoreRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub queues: Arc<dyn QueueCache>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn StoreRepository>,
        auth: Arc<dyn AuthRepository>,
        queues: Arc<dyn QueueCache>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            auth,
            queues,
        }
    }

    pub fn assembler(&self) -> SectorTreeAssembler {
        SectorTreeAssembler::new(self.store.clone(), self.config.layout.max_tree_depth)
    }

    pub fn sectors(&self) -> SectorService {
        SectorService::new(self.store.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.auth.clone(), &self.config)
    }
}
