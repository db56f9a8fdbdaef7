//! # Order Intent
//!
//! The buyer's checkout selection captured before the payment redirect.
//! An `OrderIntent` travels inside a signed order token and is never
//! persisted on its own.
//!
//! Every struct here denies unknown fields, so a payload produced under a
//! different shape fails to decode instead of being read partially.

use crate::error::{StorefrontError, StorefrontResult};
use crate::product::{Price, Product, Variant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to the purchased catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductRef {
    /// Catalog product identifier
    pub product_id: String,

    /// Platform (e.g., "netflix", "free-fire")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Product type (e.g., "account", "topup")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl ProductRef {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            platform: None,
            product_type: None,
        }
    }
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            platform: product.platform.clone(),
            product_type: product.product_type.clone(),
        }
    }
}

/// The variant the buyer picked, with the price frozen at selection time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectedVariant {
    pub label: String,
    pub duration: String,
    pub price: Price,
}

impl From<&Variant> for SelectedVariant {
    fn from(variant: &Variant) -> Self {
        Self {
            label: variant.label.clone(),
            duration: variant.duration.clone(),
            price: variant.price.clone(),
        }
    }
}

/// Buyer contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone: None,
        }
    }

    /// Builder: set phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    fn is_empty(&self) -> bool {
        blank(self.email.as_deref()) && blank(self.phone.as_deref())
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Everything needed to reconstruct an order after the payment redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderIntent {
    /// Purchased product
    pub product: ProductRef,

    /// Selected variant
    pub variant: SelectedVariant,

    /// Buyer contact details
    pub contact: Contact,

    /// Other checkout-time choices (game user id, server id, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl OrderIntent {
    /// Create an intent for a catalog product and one of its variants
    pub fn new(product: ProductRef, variant: SelectedVariant, contact: Contact) -> Self {
        Self {
            product,
            variant,
            contact,
            options: BTreeMap::new(),
        }
    }

    /// Build an intent from catalog data, freezing the catalog price
    pub fn for_product(product: &Product, variant: &Variant, contact: Contact) -> Self {
        Self::new(product.into(), variant.into(), contact)
    }

    /// Builder: add a checkout option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Check that the intent carries everything needed to fulfil the order
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.product.product_id.trim().is_empty() {
            return Err(invalid("product_id is required"));
        }
        if self.variant.label.trim().is_empty() {
            return Err(invalid("variant label is required"));
        }
        if self.variant.duration.trim().is_empty() {
            return Err(invalid("variant duration is required"));
        }
        if self.variant.price.amount < 0 {
            return Err(invalid("price must not be negative"));
        }
        if self.contact.is_empty() {
            return Err(invalid("an email or phone number is required"));
        }
        if let Some(email) = self.contact.email.as_deref() {
            if !email.trim().is_empty() && !email.contains('@') {
                return Err(invalid("email address is not valid"));
            }
        }
        if self.options.keys().any(|k| k.trim().is_empty()) {
            return Err(invalid("option names must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> StorefrontError {
    StorefrontError::InvalidRequest(message.to_string())
}
