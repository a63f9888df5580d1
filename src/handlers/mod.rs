// handlers/mod.rs - HTTP handlers in two tiers
//
// Public (no auth, /api/*) and admin (bearer session of an admin user,
// /api/admin/*). Routing lives in `routes.rs`.

pub mod admin;
pub mod public;

use crate::database::models::Store;
use crate::error::ApiError;
use crate::state::AppState;

/// Load a store or fail with 404
pub(crate) async fn require_store(state: &AppState, store_id: i64) -> Result<Store, ApiError> {
    state
        .store
        .get_store(store_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Store {store_id} not found")))
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::field_error(field, format!("{field} must not be empty")));
    }
    Ok(())
}
