// handlers/public/queues.rs - Checkout queue lengths

use axum::extract::State;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::handlers::require_store;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::{QueueEntry, QueueUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QueueUpdated {
    pub store_id: i64,
    pub checkout_number: u32,
    #[serde(flatten)]
    pub entry: QueueEntry,
}

/// GET /api/stores/:id/queues - `{ "<checkout>": { people_count, updated_at } }`, live entries only
pub async fn get_queues(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<BTreeMap<u32, QueueEntry>> {
    require_store(&state, id).await?;
    Ok(ApiResponse::success(state.queues.get_queues(id).await?))
}

/// POST /api/stores/:id/queues
pub async fn update_queue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<QueueUpdate>,
) -> ApiResult<QueueUpdated> {
    let (checkout_number, people_count) = update.validate()?;
    require_store(&state, id).await?;
    let entry = state.queues.update_queue(id, checkout_number, people_count).await?;
    Ok(ApiResponse::success(QueueUpdated {
        store_id: id,
        checkout_number,
        entry,
    }))
}
