//! # Request Handlers
//!
//! Axum request handlers for the storefront API: catalog reads, order
//! token issuing for the checkout flow, and order token verification after
//! the payment redirect.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{Contact, OrderIntent, StorefrontError};
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};

/// Message returned for every rejected order token
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired order token";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Issue order token request
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    /// Catalog product ID
    #[serde(default)]
    pub product_id: Option<String>,
    /// Variant label (e.g., "1 Month")
    #[serde(default)]
    pub variant: Option<String>,
    /// Buyer email
    #[serde(default)]
    pub email: Option<String>,
    /// Buyer phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Other checkout choices (game user id, server id, ...)
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Issued order token
#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Unix second from which the token is rejected
    pub expires_at: i64,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Verify order token request
#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message, status.as_u16())))
}

fn storefront_error_to_response(err: StorefrontError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        StorefrontError::InvalidToken(_) => INVALID_TOKEN_MESSAGE.to_string(),
        StorefrontError::Configuration(_) | StorefrontError::Catalog(_) => {
            "Internal server error".to_string()
        }
        _ => err.to_string(),
    };
    (status, Json(ErrorResponse::new(message, code)))
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Get products list
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.catalog.list_products().await.map_err(|e| {
        error!("Failed to list products: {}", e);
        storefront_error_to_response(e)
    })?;

    Ok(Json(serde_json::json!({
        "products": products,
        "count": products.len()
    })))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .find_product(&product_id)
        .await
        .map_err(storefront_error_to_response)?
        .ok_or_else(|| {
            storefront_error_to_response(StorefrontError::ProductNotFound {
                product_id: product_id.clone(),
            })
        })?;

    Ok(Json(product))
}

/// Issue an order token for the buyer's selection.
///
/// The price is taken from the catalog, never from the request.
#[instrument(skip_all)]
pub async fn issue_order_token(
    State(state): State<AppState>,
    payload: Result<Json<IssueTokenRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected issue request body: {}", rejection.body_text());
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Request body must be a JSON object",
            ));
        }
    };

    let product_id = required(request.product_id)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "product_id is required"))?;
    let variant_label = required(request.variant)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "variant is required"))?;

    let (product, variant) = state
        .catalog
        .resolve_selection(&product_id, &variant_label)
        .await
        .map_err(storefront_error_to_response)?;

    let contact = Contact {
        email: required(request.email),
        phone: required(request.phone),
    };

    let mut intent = OrderIntent::for_product(&product, &variant, contact);
    intent.options = request.options;
    intent.validate().map_err(storefront_error_to_response)?;

    let signed = state
        .tokens
        .issue_signed_order_token(&intent, state.token_ttl_secs)
        .map_err(|e| {
            error!("Failed to issue order token: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    info!(
        "Issued order token: product={}, variant={}, price={}",
        product.id,
        variant.label,
        variant.price.display()
    );

    Ok(Json(ApiResponse::ok(IssuedToken {
        token: signed.token,
        expires_at: signed.expires_at,
        expires_in: state.token_ttl_secs,
    })))
}

/// Verify an order token presented after the payment redirect.
///
/// - 400 when `token` is absent
/// - 401 with one generic message for every verification failure
/// - 200 with the order intent otherwise
#[instrument(skip_all)]
pub async fn verify_order_token(
    State(state): State<AppState>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<OrderIntent>>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected verify request body: {}", rejection.body_text());
            return Err(error_response(StatusCode::BAD_REQUEST, "token is required"));
        }
    };

    let token = required(request.token)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "token is required"))?;

    let intent = state
        .tokens
        .verify_order_token(&token)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, INVALID_TOKEN_MESSAGE))?;

    info!(
        "Verified order token: product={}, variant={}",
        intent.product.product_id, intent.variant.label
    );

    Ok(Json(ApiResponse::ok(intent)))
}

/// Response for a handler panic
pub fn internal_error_response() -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
