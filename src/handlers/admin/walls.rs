// handlers/admin/walls.rs

use axum::extract::State;

use crate::database::models::{Wall, WallInput};
use crate::handlers::require_store;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/admin/stores/:id/walls
pub async fn list_walls(State(state): State<AppState>, ApiPath(store_id): ApiPath<i64>) -> ApiResult<Vec<Wall>> {
    require_store(&state, store_id).await?;
    Ok(ApiResponse::success(state.store.list_walls(store_id).await?))
}

/// POST /api/admin/stores/:id/walls - `thickness` defaults to 0.1 m
pub async fn create_wall(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(input): ApiJson<WallInput>,
) -> ApiResult<Wall> {
    if input.thickness <= 0.0 {
        return Err(ApiError::field_error("thickness", "Wall thickness must be positive"));
    }
    require_store(&state, store_id).await?;
    Ok(ApiResponse::created(state.store.create_wall(store_id, &input).await?))
}

/// DELETE /api/admin/walls/:id
pub async fn delete_wall(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.store.delete_wall(id).await?;
    Ok(Deleted::new("Wall", id))
}
