// handlers/public/health.rs - Liveness and database checks

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DbCheck {
    pub database_status: &'static str,
    pub stores_count: i64,
}

/// GET /api/health - 503 when the repository cannot be reached
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    if let Err(e) = state.store.ping().await {
        warn!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }
    Ok(ApiResponse::success(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
        database: "connected",
    }))
}

/// GET /api/db-check
pub async fn db_check(State(state): State<AppState>) -> ApiResult<DbCheck> {
    let stores_count = state.store.count_stores().await.map_err(|e| {
        warn!("Database check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;
    Ok(ApiResponse::success(DbCheck {
        database_status: "connected",
        stores_count,
    }))
}
