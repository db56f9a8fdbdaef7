//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Catalog:
///   - GET  /api/v1/products - List active products
///   - GET  /api/v1/products/{product_id} - Get product by ID
///
/// - Checkout:
///   - POST /api/v1/checkout/token - Issue an order token for a selection
///   - POST /api/v1/checkout/verify - Verify an order token after the payment redirect
pub fn create_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    let checkout_routes = Router::new()
        .route("/token", post(handlers::issue_order_token))
        .route("/verify", post(handlers::verify_order_token));

    let api_routes = Router::new()
        .merge(catalog_routes)
        .nest("/checkout", checkout_routes);

    let router = Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", api_routes)
        .with_state(state);

    with_middleware(router)
}

/// Tracing, panic recovery and CORS, outermost first
fn with_middleware(router: Router) -> Router {
    // The storefront pages are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(cors),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Request handler panicked: {}", detail);

    handlers::internal_error_response().into_response()
}
