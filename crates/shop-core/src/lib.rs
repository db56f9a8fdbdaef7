//! # shop-core
//!
//! Core types and traits for the storefront backend.
//!
//! This crate provides:
//! - `OrderIntent` and its parts, the payload carried by order tokens
//! - `Product`, `Variant`, `Price` and `ProductCatalog` for the catalog
//! - `CatalogStore` trait for catalog lookups
//! - `StorefrontError` and `TokenError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CatalogStore, Contact, OrderIntent};
//!
//! // Price the buyer's selection from the catalog
//! let (product, variant) = catalog.resolve_selection("netflix-account", "1 Month").await?;
//!
//! // Capture the intent before the payment redirect
//! let intent = OrderIntent::for_product(&product, &variant, Contact::email("a@b.com"));
//! intent.validate()?;
//! ```

pub mod catalog;
pub mod error;
pub mod intent;
pub mod product;

// Re-exports for convenience
pub use catalog::{BoxedCatalogStore, CatalogStore, InMemoryCatalog};
pub use error::{StorefrontError, StorefrontResult, TokenError, TokenResult};
pub use intent::{Contact, OrderIntent, ProductRef, SelectedVariant};
pub use product::{Currency, Price, Product, ProductCatalog, Variant};
