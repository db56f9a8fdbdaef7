//! # Product Types
//!
//! Catalog types for the storefront: digital goods and game top-ups,
//! each sold in one or more variants (duration or denomination).
//! The bundled catalog is loaded from `config/products.toml`.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    INR,
    IDR,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "inr",
            Currency::IDR => "idr",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places used for prices
    /// (IDR and JPY are priced in whole units, INR in paise)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::IDR | Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Price {
    /// Amount in smallest currency unit
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from its smallest unit
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Format for display (e.g., "₹425.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::INR => "₹",
            Currency::IDR => "Rp",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
        };
        if self.currency.decimal_places() == 0 {
            format!("{}{}", symbol, self.amount)
        } else {
            format!("{}{:.2}", symbol, self.currency.from_smallest_unit(self.amount))
        }
    }
}

/// A purchasable variant of a product (e.g. "1 Month", "86 Diamonds")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Label shown to the buyer, unique within a product
    pub label: String,

    /// Duration or denomination description
    pub duration: String,

    /// Price
    pub price: Price,
}

impl Variant {
    pub fn new(label: impl Into<String>, duration: impl Into<String>, price: Price) -> Self {
        Self {
            label: label.into(),
            duration: duration.into(),
            price,
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (e.g., "netflix-account")
    pub id: String,

    /// Display name
    pub name: String,

    /// Platform the product belongs to (e.g., "netflix", "mobile-legends")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Product type (e.g., "account", "topup", "voucher")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,

    /// Optional image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Purchasable variants
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a new product without variants
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: None,
            product_type: None,
            description: String::new(),
            active: true,
            image_url: None,
            variants: Vec::new(),
        }
    }

    /// Builder: set platform and product type
    pub fn with_kind(mut self, platform: impl Into<String>, product_type: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self.product_type = Some(product_type.into());
        self
    }

    /// Builder: add a variant
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Find a variant by its label (case-insensitive)
    pub fn variant(&self, label: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.label.eq_ignore_ascii_case(label.trim()))
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> Self {
        self.add(product);
        self
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
