//! Mapping from a product configuration to Listings Items requests.
//!
//! [`ListingPayloadBuilder::build`] produces the full `putListingsItem` body.
//! [`ListingPayloadBuilder::patches_for`] narrows a built request down to
//! the attributes touched by a set of [`FieldChange`]s.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use validator::Validate;

use crate::config::ProductConfig;
use crate::config::catalog::{Length, find_category};
use crate::error::{ConfigError, Result};

use super::attributes as attr;
use super::diff::FieldChange;
use super::normalize::KEYWORD_SUBMISSION_CAP;

/// Requirement set submitted with every listing.
pub const LISTING_REQUIREMENTS: &str = "LISTING";

/// Outgoing listing values, checked before anything is submitted.
#[derive(Debug, Validate)]
pub struct ListingDraft {
    /// Seller SKU.
    #[validate(length(min = 3, max = 40))]
    pub sku: String,
    /// Listing title.
    #[validate(length(min = 10, max = 200))]
    pub title: String,
    /// Description.
    #[validate(length(min = 50, max = 2000))]
    pub description: String,
    /// Selling price.
    #[validate(range(min = 0.01, max = 10_000.0))]
    pub price: f64,
    /// Bullet points.
    #[validate(length(min = 1, max = 5))]
    pub bullet_points: Vec<String>,
    /// Hosted image URLs.
    #[validate(length(min = 1, max = 9))]
    pub image_urls: Vec<String>,
}

impl ListingDraft {
    /// Collects the outgoing values of a configuration.
    #[must_use]
    pub fn from_config(config: &ProductConfig, image_urls: &[String]) -> Self {
        Self {
            sku: config.sku().trim().to_string(),
            title: config.product.title.trim().to_string(),
            description: config.product.description.trim().to_string(),
            price: config.pricing.price.unwrap_or_default(),
            bullet_points: config.amazon.bullet_points.clone(),
            image_urls: image_urls.to_vec(),
        }
    }
}

/// Body of a `putListingsItem` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsItemPutRequest {
    /// Marketplace product type.
    pub product_type: String,
    /// Requirement set.
    pub requirements: String,
    /// Attribute bag.
    pub attributes: Map<String, Value>,
}

/// JSON-patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Replace the attribute with a new value.
    Replace,
    /// Remove the attribute.
    Delete,
}

/// A single `patchListingsItem` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    /// Operation kind.
    pub op: PatchOp,
    /// Attribute path, e.g. `/attributes/item_name`.
    pub path: String,
    /// New attribute value.
    pub value: Value,
}

/// Builds marketplace requests for one marketplace and currency.
#[derive(Debug, Clone)]
pub struct ListingPayloadBuilder {
    marketplace_id: String,
    currency: String,
}

impl ListingPayloadBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new(marketplace_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            marketplace_id: marketplace_id.into(),
            currency: currency.into(),
        }
    }

    /// Returns the marketplace this builder targets.
    #[must_use]
    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }

    /// Builds the full listing request.
    ///
    /// Images past the last locator slot are dropped, as are keywords past
    /// the submission cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is unknown or the outgoing values fail
    /// the submission guard.
    pub fn build(
        &self,
        config: &ProductConfig,
        image_urls: &[String],
    ) -> Result<ListingsItemPutRequest> {
        let category = find_category(&config.amazon.category).ok_or_else(|| {
            ConfigError::InvalidDocument {
                message: format!("unknown category '{}'", config.amazon.category),
            }
        })?;

        let image_urls = &image_urls[..image_urls.len().min(attr::MAX_IMAGE_LOCATORS)];
        let draft = ListingDraft::from_config(config, image_urls);
        draft.validate().map_err(|e| ConfigError::InvalidDocument {
            message: format!("listing payload rejected: {e}"),
        })?;

        let mp = self.marketplace_id.as_str();
        let specs = &config.specifications;
        let mut attributes = Map::new();

        attributes.insert(attr::ITEM_NAME.into(), json!([attr::text_entry(&draft.title, mp)]));
        attributes.insert(
            attr::PRODUCT_DESCRIPTION.into(),
            json!([attr::text_entry(&draft.description, mp)]),
        );
        attributes.insert(
            attr::BULLET_POINT.into(),
            text_list(config.amazon.bullet_points.iter(), mp),
        );

        let keywords = text_list(
            config
                .amazon
                .search_keywords
                .iter()
                .take(KEYWORD_SUBMISSION_CAP),
            mp,
        );
        if keywords.as_array().is_some_and(|k| !k.is_empty()) {
            attributes.insert(attr::GENERIC_KEYWORD.into(), keywords);
        }

        insert_text(&mut attributes, attr::WIRE_GAUGE, Some(&specs.wire_gauge), mp);
        insert_text(&mut attributes, attr::CONNECTOR_TYPE, Some(&specs.connector_type), mp);
        insert_text(&mut attributes, attr::CURRENT_RATING, specs.current_rating.as_deref(), mp);
        insert_text(&mut attributes, attr::VOLTAGE_RATING, specs.voltage_rating.as_deref(), mp);
        insert_text(
            &mut attributes,
            attr::OPERATING_TEMPERATURE_RANGE,
            specs.temperature_range.as_deref(),
            mp,
        );

        if let Some(length) = Length::parse(&specs.length) {
            attributes.insert(
                attr::ITEM_LENGTH.into(),
                json!([attr::measured_entry(length.value, length.unit.as_str(), mp)]),
            );
        }
        if let Some(pins) = specs.pin_count {
            attributes.insert(
                attr::NUMBER_OF_PINS.into(),
                json!([attr::value_entry(json!(pins), mp)]),
            );
        }

        attributes.insert(
            attr::PURCHASABLE_OFFER.into(),
            json!([attr::offer_entry(draft.price, &self.currency, mp)]),
        );
        if let Some(list_price) = config.pricing.compare_at_price {
            attributes.insert(
                attr::LIST_PRICE.into(),
                json!([attr::list_price_entry(list_price, &self.currency, mp)]),
            );
        }

        for (locator, url) in attr::image_locators().into_iter().zip(image_urls) {
            attributes.insert(locator, json!([attr::image_entry(url, mp)]));
        }

        debug!(
            "Built {} attribute(s) for {} as {}",
            attributes.len(),
            draft.sku,
            category.product_type
        );

        Ok(ListingsItemPutRequest {
            product_type: category.product_type.to_string(),
            requirements: LISTING_REQUIREMENTS.to_string(),
            attributes,
        })
    }

    /// Patch operations covering the attributes touched by `changes`.
    ///
    /// Each attribute is patched once, in the order its first change
    /// appears. Attributes the request no longer carries are deleted.
    #[must_use]
    pub fn patches_for(
        &self,
        request: &ListingsItemPutRequest,
        changes: &[FieldChange],
    ) -> Vec<PatchOperation> {
        let mut touched: Vec<String> = Vec::new();
        for change in changes {
            for attribute in attributes_for_change(change) {
                if !touched.contains(&attribute) {
                    touched.push(attribute);
                }
            }
        }

        touched
            .into_iter()
            .map(|attribute| {
                let path = format!("/attributes/{attribute}");
                match request.attributes.get(&attribute) {
                    Some(value) => PatchOperation {
                        op: PatchOp::Replace,
                        path,
                        value: value.clone(),
                    },
                    None => PatchOperation {
                        op: PatchOp::Delete,
                        path,
                        value: json!([{ "marketplace_id": self.marketplace_id }]),
                    },
                }
            })
            .collect()
    }
}

/// Marketplace attributes a change touches.
///
/// An image count change touches every locator slot up to the larger of the
/// two counts, so slots that are no longer used get deleted.
fn attributes_for_change(change: &FieldChange) -> Vec<String> {
    let attribute = match change.field.as_str() {
        "title" => attr::ITEM_NAME,
        "description" => attr::PRODUCT_DESCRIPTION,
        "price" => attr::PURCHASABLE_OFFER,
        "wire_gauge" => attr::WIRE_GAUGE,
        "length" => attr::ITEM_LENGTH,
        "connector_type" => attr::CONNECTOR_TYPE,
        "pin_count" => attr::NUMBER_OF_PINS,
        "current_rating" => attr::CURRENT_RATING,
        "voltage_rating" => attr::VOLTAGE_RATING,
        "temperature_range" => attr::OPERATING_TEMPERATURE_RANGE,
        "search_keywords" => attr::GENERIC_KEYWORD,
        "image_count" => {
            let count = |value: &Option<String>| {
                value
                    .as_deref()
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or_default()
            };
            let slots = count(&change.old_value)
                .max(count(&change.new_value))
                .min(attr::MAX_IMAGE_LOCATORS);
            return attr::image_locators().into_iter().take(slots).collect();
        }
        f if f.starts_with("bullet_point_") => attr::BULLET_POINT,
        _ => return Vec::new(),
    };
    vec![attribute.to_string()]
}

fn text_list<'a>(items: impl Iterator<Item = &'a String>, marketplace_id: &str) -> Value {
    Value::Array(
        items
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| attr::text_entry(s, marketplace_id))
            .collect(),
    )
}

fn insert_text(
    attributes: &mut Map<String, Value>,
    key: &str,
    value: Option<&str>,
    marketplace_id: &str,
) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        attributes.insert(key.to_string(), json!([attr::text_entry(value, marketplace_id)]));
    }
}
