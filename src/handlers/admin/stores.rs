// handlers/admin/stores.rs - Store CRUD

use axum::extract::State;
use tracing::info;

use crate::database::models::{Store, StoreInput};
use crate::error::ApiError;
use crate::handlers::require_non_empty;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

fn validate(input: &StoreInput) -> Result<(), ApiError> {
    require_non_empty("name", &input.name)
}

/// POST /api/admin/stores
pub async fn create_store(State(state): State<AppState>, ApiJson(input): ApiJson<StoreInput>) -> ApiResult<Store> {
    validate(&input)?;
    let store = state.store.create_store(&input).await?;
    info!("Created store {} '{}'", store.id, store.name);
    Ok(ApiResponse::created(store))
}

/// PUT /api/admin/stores/:id
pub async fn update_store(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<StoreInput>,
) -> ApiResult<Store> {
    validate(&input)?;
    Ok(ApiResponse::success(state.store.update_store(id, &input).await?))
}

/// DELETE /api/admin/stores/:id - takes the whole layout with it
pub async fn delete_store(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.store.delete_store(id).await?;
    info!("Deleted store {}", id);
    Ok(Deleted::new("Store", id))
}
