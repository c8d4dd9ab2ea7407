//! Typed view of a product configuration file.
//!
//! These structs map the `product.yaml` layout. They are only built from a
//! document that already went through [`ConfigValidator`](super::ConfigValidator),
//! and every field is defaulted so a partial document still maps and the
//! change detector can treat missing values as empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// The root configuration structure for a product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductConfig {
    /// Identity and copy.
    pub product: ProductInfo,
    /// Electrical and mechanical specifications.
    pub specifications: Specifications,
    /// Pricing.
    pub pricing: Pricing,
    /// Image file paths, in display order. The first is the main image.
    pub images: Vec<String>,
    /// Marketplace metadata.
    pub amazon: AmazonMetadata,
}

/// Product identity and copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProductInfo {
    /// Listing title.
    pub title: String,
    /// Seller SKU.
    pub sku: String,
    /// Long-form description.
    pub description: String,
}

/// Harness specifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Specifications {
    /// Number of pins.
    pub pin_count: Option<u32>,
    /// Wire gauge, e.g. "18 AWG".
    pub wire_gauge: String,
    /// Cable length, e.g. "24 inches".
    pub length: String,
    /// Connector type.
    pub connector_type: String,
    /// Current rating, e.g. "5A".
    pub current_rating: Option<String>,
    /// Voltage rating, e.g. "12V DC".
    pub voltage_rating: Option<String>,
    /// Operating temperature range.
    pub temperature_range: Option<String>,
}

/// Pricing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Pricing {
    /// Selling price.
    pub price: Option<f64>,
    /// Optional list price shown struck through.
    pub compare_at_price: Option<f64>,
}

/// Marketplace metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AmazonMetadata {
    /// Category key from the category table.
    pub category: String,
    /// Search keywords.
    pub search_keywords: Vec<String>,
    /// Bullet points, in display order.
    pub bullet_points: Vec<String>,
}

impl ProductConfig {
    /// Maps a parsed document to the typed view.
    ///
    /// # Errors
    ///
    /// Returns an error if a present field has a type the typed view cannot hold.
    pub fn from_document(document: &Value) -> Result<Self> {
        serde_json::from_value(document.clone()).map_err(|e| {
            ConfigError::InvalidDocument {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Returns the listing SKU.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.product.sku
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_full_document() {
        let doc = json!({
            "product": { "title": "Harness", "sku": "WH-4", "description": "d" },
            "specifications": {
                "pin_count": 4,
                "wire_gauge": "18 AWG",
                "length": "12 in",
                "connector_type": "JST Connector",
                "voltage_rating": "12V",
            },
            "pricing": { "price": 19.99, "compare_at_price": 24.5 },
            "images": ["a.jpg", "b.png"],
            "amazon": {
                "category": "automotive-parts",
                "search_keywords": ["harness"],
                "bullet_points": ["one"],
            },
        });

        let config = ProductConfig::from_document(&doc).unwrap();
        assert_eq!(config.sku(), "WH-4");
        assert_eq!(config.specifications.pin_count, Some(4));
        assert_eq!(config.specifications.voltage_rating.as_deref(), Some("12V"));
        assert_eq!(config.pricing.compare_at_price, Some(24.5));
        assert_eq!(config.images.len(), 2);
    }

    #[test]
    fn test_partial_document_maps_with_defaults() {
        let doc = json!({ "product": { "sku": "WH-4" } });

        let config = ProductConfig::from_document(&doc).unwrap();
        assert!(config.product.description.is_empty());
        assert_eq!(config.pricing.price, None);
        assert!(config.amazon.bullet_points.is_empty());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let doc = json!({ "specifications": { "pin_count": "four" } });
        assert!(ProductConfig::from_document(&doc).is_err());
    }
}
