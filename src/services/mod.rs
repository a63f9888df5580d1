pub mod auth_service;
pub mod queue_service;
pub mod sector_service;
pub mod sector_tree;
pub mod seed;

pub use auth_service::{AuthError, AuthService, LoginResponse, UserInfo};
pub use queue_service::{MemoryQueueCache, QueueCache, QueueEntry, QueueError, QueueUpdate, RedisQueueCache};
pub use sector_service::{SectorError, SectorService};
pub use sector_tree::{HierarchyReport, SectorNode, SectorTreeAssembler, TreeError};
pub use seed::{seed_demo_data, SeedError, SeedSummary, StoreFixture};
