//! Canonical listing snapshots.
//!
//! A [`ListingSnapshot`] is the common representation both sides of a
//! comparison are projected into: the marketplace's attribute bag through
//! [`ListingSnapshot::from_remote`] and the local configuration through
//! [`ListingSnapshot::from_config`]. Values are already normalized, so
//! comparing two snapshots is plain equality per field.

use serde_json::{Map, Value};

use crate::config::ProductConfig;

use super::attributes as attr;
use super::normalize::{self, KEYWORD_SUBMISSION_CAP};

/// Normalized view of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSnapshot {
    /// Listing title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Selling price, two decimals.
    pub price: Option<String>,
    /// Bullet points in display order.
    pub bullet_points: Vec<Option<String>>,
    /// Wire gauge.
    pub wire_gauge: Option<String>,
    /// Length as `"<value> <unit>"`.
    pub length: Option<String>,
    /// Connector type.
    pub connector_type: Option<String>,
    /// Pin count.
    pub pin_count: Option<String>,
    /// Current rating.
    pub current_rating: Option<String>,
    /// Voltage rating.
    pub voltage_rating: Option<String>,
    /// Operating temperature range.
    pub temperature_range: Option<String>,
    /// Sorted keyword set.
    pub search_keywords: Option<String>,
    /// Number of images.
    pub image_count: Option<String>,
}

impl ListingSnapshot {
    /// Projects a `getListingsItem` response.
    ///
    /// Returns `None` when the response is not an object at all. Individual
    /// attributes that are missing or malformed become empty.
    #[must_use]
    pub fn from_remote(remote: &Value) -> Option<Self> {
        let root = remote.as_object()?;
        let empty = Map::new();
        let attributes = root
            .get("attributes")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let summary = root
            .get("summaries")
            .and_then(|s| s.get(0))
            .and_then(Value::as_object);

        let text = |key: &str| attr::first_value(attributes, key).and_then(normalize::scalar);

        let title = text(attr::ITEM_NAME).or_else(|| {
            summary
                .and_then(|s| s.get("itemName"))
                .and_then(normalize::scalar)
        });

        let length = attr::entries(attributes, attr::ITEM_LENGTH)
            .first()
            .and_then(|entry| {
                let value = entry.get("value")?;
                let magnitude = value
                    .as_f64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
                let unit = entry.get("unit").and_then(Value::as_str).unwrap_or_default();
                Some(normalize::length_parts(magnitude, unit))
            })
            .or_else(|| {
                attr::first_value(attributes, attr::ITEM_LENGTH)
                    .and_then(Value::as_str)
                    .and_then(normalize::length)
            });

        let keywords: Vec<String> = attr::all_values(attributes, attr::GENERIC_KEYWORD)
            .into_iter()
            .filter_map(normalize::scalar)
            .collect();

        let mut images = attr::image_count(attributes);
        if images == 0
            && summary
                .and_then(|s| s.get("mainImage"))
                .is_some_and(Value::is_object)
        {
            images = 1;
        }

        Some(Self {
            title,
            description: text(attr::PRODUCT_DESCRIPTION),
            price: attr::offer_price(attributes).and_then(normalize::scalar_price),
            bullet_points: attr::entries(attributes, attr::BULLET_POINT)
                .iter()
                .map(|entry| entry.get("value").and_then(normalize::scalar))
                .collect(),
            wire_gauge: text(attr::WIRE_GAUGE),
            length,
            connector_type: text(attr::CONNECTOR_TYPE),
            pin_count: text(attr::NUMBER_OF_PINS),
            current_rating: text(attr::CURRENT_RATING),
            voltage_rating: text(attr::VOLTAGE_RATING),
            temperature_range: text(attr::OPERATING_TEMPERATURE_RANGE),
            search_keywords: normalize::sorted_list(keywords),
            image_count: normalize::count(images),
        })
    }

    /// Projects a local configuration.
    ///
    /// Keywords and images are capped the same way they are when the
    /// configuration is submitted, so values that would never reach the
    /// marketplace never show up as differences.
    #[must_use]
    pub fn from_config(config: &ProductConfig) -> Self {
        let specs = &config.specifications;

        Self {
            title: normalize::text(&config.product.title),
            description: normalize::text(&config.product.description),
            price: config.pricing.price.map(normalize::price),
            bullet_points: config
                .amazon
                .bullet_points
                .iter()
                .map(|b| normalize::text(b))
                .collect(),
            wire_gauge: normalize::text(&specs.wire_gauge),
            length: normalize::length(&specs.length),
            connector_type: normalize::text(&specs.connector_type),
            pin_count: specs.pin_count.map(|p| p.to_string()),
            current_rating: normalize::optional_text(specs.current_rating.as_deref()),
            voltage_rating: normalize::optional_text(specs.voltage_rating.as_deref()),
            temperature_range: normalize::optional_text(specs.temperature_range.as_deref()),
            search_keywords: normalize::sorted_list(
                config
                    .amazon
                    .search_keywords
                    .iter()
                    .take(KEYWORD_SUBMISSION_CAP),
            ),
            image_count: normalize::count(config.images.len().min(attr::MAX_IMAGE_LOCATORS)),
        }
    }
}
