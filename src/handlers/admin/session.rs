// handlers/admin/session.rs - Current admin and logout

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use tracing::info;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/admin/auth/whoami
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/auth/session - invalidate the token used for this request
pub async fn logout(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    state.auth_service().logout(&user.token).await?;
    info!("User '{}' logged out", user.username);
    Ok(ApiResponse::success(json!({ "message": "Logged out" })))
}
