use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin resolved from the bearer session token
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub token: String,
}

impl AuthUser {
    fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            token,
        }
    }
}

/// Guards `/api/admin/*`: 401 without a live session, 403 for non-admin users
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers).map_err(ApiError::unauthorized)?;
    let user = state.auth_service().require_admin(&token).await?;

    request.extensions_mut().insert(AuthUser::new(user, token));
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
