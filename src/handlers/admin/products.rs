// handlers/admin/products.rs - Product CRUD

use axum::extract::State;
use rust_decimal::Decimal;

use crate::database::models::{Product, ProductInput};
use crate::error::ApiError;
use crate::handlers::require_non_empty;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

fn validate(input: &ProductInput) -> Result<(), ApiError> {
    require_non_empty("name", &input.name)?;
    if input.price < Decimal::ZERO {
        return Err(ApiError::field_error("price", "Price must not be negative"));
    }
    Ok(())
}

async fn require_sector(state: &AppState, sector_id: i64) -> Result<(), ApiError> {
    match state.store.get_sector(sector_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("Sector {sector_id} not found"))),
    }
}

/// GET /api/admin/sectors/:id/products
pub async fn list_products(State(state): State<AppState>, ApiPath(sector_id): ApiPath<i64>) -> ApiResult<Vec<Product>> {
    require_sector(&state, sector_id).await?;
    Ok(ApiResponse::success(state.store.find_products(sector_id).await?))
}

/// POST /api/admin/sectors/:id/products
pub async fn create_product(
    State(state): State<AppState>,
    ApiPath(sector_id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    validate(&input)?;
    require_sector(&state, sector_id).await?;
    Ok(ApiResponse::created(state.store.create_product(sector_id, &input).await?))
}

/// PUT /api/admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    validate(&input)?;
    Ok(ApiResponse::success(state.store.update_product(id, &input).await?))
}

/// DELETE /api/admin/products/:id
pub async fn delete_product(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Deleted> {
    state.store.delete_product(id).await?;
    Ok(Deleted::new("Product", id))
}
