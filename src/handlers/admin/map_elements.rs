// handlers/admin/map_elements.rs - Free-standing map shapes

use axum::extract::State;

use crate::database::models::{MapElement, MapElementInput};
use crate::error::ApiError;
use crate::handlers::{require_non_empty, require_store};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// Optional sector/beacon links must point into the element's own store
async fn validate(state: &AppState, store_id: i64, input: &MapElementInput) -> Result<(), ApiError> {
    require_non_empty("type", &input.element_type)?;
    if let Some(sector_id) = input.sector_id {
        let linked = state.store.get_sector(sector_id).await?;
        if linked.map(|s| s.store_id) != Some(store_id) {
            return Err(ApiError::field_error("sector_id", format!("Sector {sector_id} is not part of store {store_id}")));
        }
    }
    if let Some(beacon_id) = input.beacon_id {
        let linked = state.store.get_beacon(beacon_id).await?;
        if linked.map(|b| b.store_id) != Some(store_id) {
            return Err(ApiError::field_error("beacon_id", format!("Beacon {beacon_id} is not part of store {store_id}")));
        }
    }
    Ok(())
}

/// GET /api/admin/stores/:id/map-elements
pub async fn list_map_elements(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
) -> ApiResult<Vec<MapElement>> {
    require_store(&state, store_id).await?;
    Ok(ApiResponse::success(state.store.list_map_elements(store_id).await?))
}

/// POST /api/admin/stores/:id/map-elements
pub async fn create_map_element(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(input): ApiJson<MapElementInput>,
) -> ApiResult<MapElement> {
    require_store(&state, store_id).await?;
    validate(&state, store_id, &input).await?;
    Ok(ApiResponse::created(state.store.create_map_element(store_id, &input).await?))
}

/// PUT /api/admin/map-elements/:id
pub async fn update_map_element(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<MapElementInput>,
) -> ApiResult<MapElement> {
    let existing = state
        .store
        .get_map_element(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Map element {id} not found")))?;
    validate(&state, existing.store_id, &input).await?;
    Ok(ApiResponse::success(state.store.update_map_element(id, &input).await?))
}

/// DELETE /api/admin/map-elements/:id
pub async fn delete_map_element(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.store.delete_map_element(id).await?;
    Ok(Deleted::new("Map element", id))
}
