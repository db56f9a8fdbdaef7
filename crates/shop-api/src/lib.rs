//! # shop-api
//!
//! HTTP API layer for the storefront backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Catalog read endpoints
//! - Order token issuing and verification for the checkout flow
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/products` | List products |
//! | GET | `/api/v1/products/{product_id}` | Get product |
//! | POST | `/api/v1/checkout/token` | Issue order token |
//! | POST | `/api/v1/checkout/verify` | Verify order token |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
