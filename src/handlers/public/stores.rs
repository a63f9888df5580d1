// handlers/public/stores.rs - Store listing, layout tree and product search

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::models::{Beacon, MapConfigResponse, MapElement, Product, Store, Wall};
use crate::handlers::require_store;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::SectorNode;
use crate::state::AppState;

/// Store with its assembled sector forest
#[derive(Debug, Serialize)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub sectors: Vec<SectorNode>,
}

/// Everything a renderer needs to draw one store
#[derive(Debug, Serialize)]
pub struct StoreMap {
    pub store: Store,
    pub sectors: Vec<SectorNode>,
    pub walls: Vec<Wall>,
    pub map_elements: Vec<MapElement>,
    pub beacons: Vec<Beacon>,
    pub map_config: MapConfigResponse,
}

#[derive(Debug, Deserialize)]
pub struct ProductSearch {
    #[serde(default)]
    pub q: String,
}

/// GET /api/stores
pub async fn list_stores(State(state): State<AppState>) -> ApiResult<Vec<Store>> {
    Ok(ApiResponse::success(state.store.list_stores().await?))
}

/// GET /api/stores/:id - store fields plus `sectors`, the nested sector tree
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1, "name": "...", "address": "...",
///     "sectors": [
///       { "id": 1, "level": 0, "parent_id": null, "products": [...], "sub_sectors": [...] }
///     ]
///   }
/// }
/// ```
pub async fn get_store(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<StoreDetail> {
    let store = require_store(&state, id).await?;
    let sectors = state.assembler().build_sector_tree(id).await?;
    Ok(ApiResponse::success(StoreDetail { store, sectors }))
}

/// GET /api/stores/:id/map
pub async fn get_store_map(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<StoreMap> {
    let store = require_store(&state, id).await?;
    let sectors = state.assembler().build_sector_tree(id).await?;
    let walls = state.store.list_walls(id).await?;
    let map_elements = state.store.list_map_elements(id).await?;
    let beacons = state.store.list_beacons(id).await?;
    let map_config = MapConfigResponse::resolve(id, state.store.get_map_config(id).await?);

    Ok(ApiResponse::success(StoreMap {
        store,
        sectors,
        walls,
        map_elements,
        beacons,
        map_config,
    }))
}

/// GET /api/stores/:id/products?q=milk
pub async fn search_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(search): ApiQuery<ProductSearch>,
) -> ApiResult<Vec<Product>> {
    require_store(&state, id).await?;
    Ok(ApiResponse::success(state.store.search_products(id, &search.q).await?))
}
