// handlers/admin/map_config.rs - Real-world to pixel mapping per store

use axum::extract::State;

use crate::database::models::{MapConfigResponse, MapSettings};
use crate::error::ApiError;
use crate::handlers::require_store;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

fn validate(settings: &MapSettings) -> Result<(), ApiError> {
    let dimensions = [
        ("real_width", settings.real_width),
        ("real_height", settings.real_height),
        ("map_width", settings.map_width),
        ("map_height", settings.map_height),
        ("scale", settings.scale),
    ];
    for (field, value) in dimensions {
        if value.is_nan() || value <= 0.0 {
            return Err(ApiError::field_error(field, format!("{field} must be positive")));
        }
    }
    Ok(())
}

/// GET /api/admin/stores/:id/map-config - defaults (`is_default: true`) when none is stored
pub async fn get_map_config(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
) -> ApiResult<MapConfigResponse> {
    require_store(&state, store_id).await?;
    let stored = state.store.get_map_config(store_id).await?;
    Ok(ApiResponse::success(MapConfigResponse::resolve(store_id, stored)))
}

/// POST /api/admin/stores/:id/map-config - create or replace
pub async fn save_map_config(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(settings): ApiJson<MapSettings>,
) -> ApiResult<MapConfigResponse> {
    validate(&settings)?;
    require_store(&state, store_id).await?;
    let saved = state.store.upsert_map_config(store_id, &settings).await?;
    Ok(ApiResponse::success(MapConfigResponse::resolve(store_id, Some(saved))))
}
