// handlers/admin/sectors.rs - Sector CRUD and hierarchy audit

use axum::extract::State;

use crate::database::models::{Sector, SectorInput};
use crate::handlers::require_store;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::services::HierarchyReport;
use crate::state::AppState;

/// GET /api/admin/stores/:id/sectors - flat list, ordered by id
pub async fn list_sectors(State(state): State<AppState>, ApiPath(store_id): ApiPath<i64>) -> ApiResult<Vec<Sector>> {
    Ok(ApiResponse::success(state.sectors().list(store_id).await?))
}

/// POST /api/admin/stores/:id/sectors
///
/// `level` in the body is ignored; it is derived from `parent_id`, which
/// must name a sector of the same store.
pub async fn create_sector(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(input): ApiJson<SectorInput>,
) -> ApiResult<Sector> {
    Ok(ApiResponse::created(state.sectors().create(store_id, input).await?))
}

/// GET /api/admin/stores/:id/sectors/audit
pub async fn audit_sectors(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
) -> ApiResult<HierarchyReport> {
    require_store(&state, store_id).await?;
    Ok(ApiResponse::success(state.assembler().audit(store_id).await?))
}

/// PUT /api/admin/sectors/:id - 409 when the new parent is the sector itself or below it
pub async fn update_sector(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<SectorInput>,
) -> ApiResult<Sector> {
    Ok(ApiResponse::success(state.sectors().update(id, input).await?))
}

/// DELETE /api/admin/sectors/:id - removes the subtree and its products
pub async fn delete_sector(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.sectors().delete(id).await?;
    Ok(Deleted::new("Sector", id))
}
