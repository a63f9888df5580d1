// handlers/admin/mod.rs - Admin handlers
//
// Every route here sits behind `admin_auth_middleware`: a bearer session
// token of a user with role `admin`. Handlers receive the caller as
// `Extension<AuthUser>` when they need it.
// Route prefix: /api/admin

pub mod beacons;
pub mod map_config;
pub mod map_elements;
pub mod products;
pub mod sectors;
pub mod session;
pub mod stores;
pub mod walls;
