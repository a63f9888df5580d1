pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::{PgAuthRepository, PgStoreRepository};
pub use repository::{AuthRepository, SectorSource, StoreRepository};
