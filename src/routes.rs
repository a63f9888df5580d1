use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{admin, public};
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

/// Full application router with global layers applied
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Public
        .route("/", get(root))
        .merge(public_routes())
        // Admin, behind the session guard
        .nest("/api/admin", admin_routes(state.clone()))
        // Global middleware
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(public::health::health))
        .route("/api/db-check", get(public::health::db_check))
        .route("/api/stores", get(public::stores::list_stores))
        .route("/api/stores/:id", get(public::stores::get_store))
        .route("/api/stores/:id/map", get(public::stores::get_store_map))
        .route("/api/stores/:id/products", get(public::stores::search_products))
        .route(
            "/api/stores/:id/queues",
            get(public::queues::get_queues).post(public::queues::update_queue),
        )
        .route("/api/auth/login", post(public::login::login))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Session
        .route("/auth/whoami", get(admin::session::whoami))
        .route("/auth/session", delete(admin::session::logout))
        // Stores
        .route("/stores", post(admin::stores::create_store))
        .route(
            "/stores/:id",
            put(admin::stores::update_store).delete(admin::stores::delete_store),
        )
        // Sectors
        .route(
            "/stores/:id/sectors",
            get(admin::sectors::list_sectors).post(admin::sectors::create_sector),
        )
        .route("/stores/:id/sectors/audit", get(admin::sectors::audit_sectors))
        .route(
            "/sectors/:id",
            put(admin::sectors::update_sector).delete(admin::sectors::delete_sector),
        )
        // Products
        .route(
            "/sectors/:id/products",
            get(admin::products::list_products).post(admin::products::create_product),
        )
        .route(
            "/products/:id",
            put(admin::products::update_product).delete(admin::products::delete_product),
        )
        // Beacons
        .route("/beacons", post(admin::beacons::create_beacon))
        .route("/stores/:id/beacons", get(admin::beacons::list_beacons))
        .route(
            "/beacons/:id",
            put(admin::beacons::update_beacon).delete(admin::beacons::delete_beacon),
        )
        // Map elements
        .route(
            "/stores/:id/map-elements",
            get(admin::map_elements::list_map_elements).post(admin::map_elements::create_map_element),
        )
        .route(
            "/map-elements/:id",
            put(admin::map_elements::update_map_element).delete(admin::map_elements::delete_map_element),
        )
        // Walls
        .route(
            "/stores/:id/walls",
            get(admin::walls::list_walls).post(admin::walls::create_wall),
        )
        .route("/walls/:id", delete(admin::walls::delete_wall))
        // Map config
        .route(
            "/stores/:id/map-config",
            get(admin::map_config::get_map_config).post(admin::map_config::save_map_config),
        )
        .route_layer(from_fn_with_state(state, admin_auth_middleware))
}

/// Origins come from configuration; `*` opens the API to any origin without credentials
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(86400));

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Store Navigator API",
            "version": version,
            "description": "Store layouts, sector trees and checkout queues for map renderers",
            "endpoints": {
                "health": "/api/health, /api/db-check (public)",
                "stores": "/api/stores[/:id[/map|/products]] (public)",
                "queues": "/api/stores/:id/queues (public)",
                "login": "/api/auth/login (public - token acquisition)",
                "admin": "/api/admin/* (requires admin session)",
            }
        }
    }))
}
