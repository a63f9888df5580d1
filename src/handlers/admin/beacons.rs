// handlers/admin/beacons.rs - BLE beacon CRUD

use axum::extract::State;

use crate::database::models::{Beacon, BeaconInput};
use crate::error::ApiError;
use crate::handlers::{require_non_empty, require_store};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// MAC addresses are stored as given; uniqueness is case-insensitive
fn validate(input: &BeaconInput) -> Result<(), ApiError> {
    require_non_empty("mac", &input.mac)?;
    require_non_empty("type", &input.beacon_type)
}

/// GET /api/admin/stores/:id/beacons
pub async fn list_beacons(State(state): State<AppState>, ApiPath(store_id): ApiPath<i64>) -> ApiResult<Vec<Beacon>> {
    require_store(&state, store_id).await?;
    Ok(ApiResponse::success(state.store.list_beacons(store_id).await?))
}

/// POST /api/admin/beacons - the body carries `store_id`; a duplicate MAC is a 409
pub async fn create_beacon(State(state): State<AppState>, ApiJson(input): ApiJson<BeaconInput>) -> ApiResult<Beacon> {
    validate(&input)?;
    require_store(&state, input.store_id).await?;
    Ok(ApiResponse::created(state.store.create_beacon(&input).await?))
}

/// PUT /api/admin/beacons/:id - a beacon stays in its store; map elements link to it by store
pub async fn update_beacon(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<BeaconInput>,
) -> ApiResult<Beacon> {
    validate(&input)?;
    let existing = state
        .store
        .get_beacon(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Beacon {id} not found")))?;
    if input.store_id != existing.store_id {
        return Err(ApiError::field_error(
            "store_id",
            format!("Beacon {id} belongs to store {} and cannot be moved", existing.store_id),
        ));
    }
    Ok(ApiResponse::success(state.store.update_beacon(id, &input).await?))
}

/// DELETE /api/admin/beacons/:id
pub async fn delete_beacon(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.store.delete_beacon(id).await?;
    Ok(Deleted::new("Beacon", id))
}
