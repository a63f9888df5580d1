// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read access for map renderers, the checkout queue feed and login.
// Route prefix: /api

pub mod health;
pub mod login;
pub mod queues;
pub mod stores;
