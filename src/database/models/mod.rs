pub mod beacon;
pub mod map_config;
pub mod map_element;
pub mod product;
pub mod sector;
pub mod session;
pub mod store;
pub mod user;
pub mod wall;

pub use beacon::{Beacon, BeaconInput};
pub use map_config::{MapConfigResponse, MapSettings, StoreMapConfig};
pub use map_element::{MapElement, MapElementInput};
pub use product::{Product, ProductInput};
pub use sector::{NewSector, Sector, SectorInput};
pub use session::UserSession;
pub use store::{Store, StoreInput};
pub use user::{NewUser, User, UserRole};
pub use wall::{Wall, WallInput};
