// handlers/public/login.rs - POST /api/auth/login

use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::LoginResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Exchange credentials for a session token
///
/// Input: `{ "username": "admin", "password": "..." }`
///
/// Output: `{ "token": "<hex>", "expires_at": "...", "user": { "id", "username", "role" } }`.
/// Bad credentials are a 401 whether the user exists or not.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state
        .auth_service()
        .login(request.username.trim(), &request.password)
        .await?;
    Ok(ApiResponse::success(response))
}
