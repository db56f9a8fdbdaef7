//! # Catalog Store
//!
//! Read interface over the product catalog. The production catalog lives in
//! a document database owned by the admin panel; the storefront only needs
//! lookups, so the seam is a trait and the bundled implementation is an
//! in-memory catalog loaded from TOML.
//!
//! ```text
//!            CatalogStore (trait)
//!            ├── list_products()
//!            ├── find_product()
//!            └── resolve_selection()
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴────────┐     ┌────────┴───────┐
//!  │ InMemoryCatalog│     │ document store │
//!  │   (TOML file)  │     │   (external)   │
//!  └────────────────┘     └────────────────┘
//! ```

use crate::error::{StorefrontError, StorefrontResult};
use crate::product::{Product, ProductCatalog, Variant};
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to catalog products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products that can currently be bought
    async fn list_products(&self) -> StorefrontResult<Vec<Product>>;

    /// Look up an active product by ID
    async fn find_product(&self, product_id: &str) -> StorefrontResult<Option<Product>>;

    /// Resolve a buyer's selection into the catalog product and variant.
    ///
    /// Prices always come from here, never from the client.
    async fn resolve_selection(
        &self,
        product_id: &str,
        variant_label: &str,
    ) -> StorefrontResult<(Product, Variant)> {
        let product = self
            .find_product(product_id)
            .await?
            .ok_or_else(|| StorefrontError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        let variant = product.variant(variant_label).cloned().ok_or_else(|| {
            StorefrontError::VariantNotFound {
                product_id: product_id.to_string(),
                label: variant_label.to_string(),
            }
        })?;

        Ok((product, variant))
    }

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shared catalog store (dynamic dispatch)
pub type BoxedCatalogStore = Arc<dyn CatalogStore>;

/// Catalog held entirely in memory, immutable after startup
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    catalog: ProductCatalog,
}

impl InMemoryCatalog {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self { catalog }
    }

    /// Parse a TOML catalog document
    pub fn from_toml(toml_str: &str) -> StorefrontResult<Self> {
        let catalog = ProductCatalog::from_toml(toml_str)
            .map_err(|e| StorefrontError::Configuration(format!("Invalid catalog: {}", e)))?;
        Ok(Self::new(catalog))
    }

    /// Number of products, including inactive ones
    pub fn len(&self) -> usize {
        self.catalog.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.products.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_products(&self) -> StorefrontResult<Vec<Product>> {
        Ok(self.catalog.active_products().cloned().collect())
    }

    async fn find_product(&self, product_id: &str) -> StorefrontResult<Option<Product>> {
        Ok(self
            .catalog
            .get(product_id)
            .filter(|p| p.active)
            .cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Currency, Price};

    fn catalog() -> InMemoryCatalog {
        let mut retired = Product::new("old-voucher", "Old Voucher")
            .with_variant(Variant::new("10", "10 credits", Price::new(100, Currency::INR)));
        retired.active = false;

        InMemoryCatalog::new(
            ProductCatalog::new()
                .with_product(
                    Product::new("netflix-account", "Netflix Premium")
                        .with_kind("netflix", "account")
                        .with_variant(Variant::new(
                            "1 Month",
                            "1 Month",
                            Price::new(42500, Currency::INR),
                        )),
                )
                .with_product(retired),
        )
    }

    #[tokio::test]
    async fn test_list_only_active_products() {
        let store = catalog();
        let products = store.list_products().await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "netflix-account");
    }

    #[tokio::test]
    async fn test_resolve_selection() {
        let store = catalog();

        let (product, variant) = store
            .resolve_selection("netflix-account", "1 Month")
            .await
            .unwrap();
        assert_eq!(product.id, "netflix-account");
        assert_eq!(variant.price.amount, 42500);

        let missing = store.resolve_selection("nope", "1 Month").await;
        assert!(matches!(missing, Err(StorefrontError::ProductNotFound { .. })));

        let missing_variant = store.resolve_selection("netflix-account", "1 Year").await;
        assert!(matches!(
            missing_variant,
            Err(StorefrontError::VariantNotFound { .. })
        ));

        let inactive = store.resolve_selection("old-voucher", "10").await;
        assert!(matches!(inactive, Err(StorefrontError::ProductNotFound { .. })));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = InMemoryCatalog::from_toml("[[products]]\nid = 5").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
