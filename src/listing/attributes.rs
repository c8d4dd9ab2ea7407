//! Marketplace attribute names and the `{value, marketplace_id}` wrapper.
//!
//! Everything that knows the shape of a Listings Items attribute bag lives
//! here. The snapshot adapter reads through these helpers and the payload
//! builder writes through them, so a change in the remote format is a change
//! in this file only.

use serde_json::{Map, Value, json};

/// Listing title.
pub const ITEM_NAME: &str = "item_name";
/// Long description.
pub const PRODUCT_DESCRIPTION: &str = "product_description";
/// Bullet points, one entry per bullet.
pub const BULLET_POINT: &str = "bullet_point";
/// Search keywords, one entry per keyword.
pub const GENERIC_KEYWORD: &str = "generic_keyword";
/// Wire gauge.
pub const WIRE_GAUGE: &str = "wire_gauge";
/// Cable length as `{value, unit}`.
pub const ITEM_LENGTH: &str = "item_length";
/// Connector type.
pub const CONNECTOR_TYPE: &str = "connector_type";
/// Pin count.
pub const NUMBER_OF_PINS: &str = "number_of_pins";
/// Current rating.
pub const CURRENT_RATING: &str = "current_rating";
/// Voltage rating.
pub const VOLTAGE_RATING: &str = "voltage_rating";
/// Operating temperature range.
pub const OPERATING_TEMPERATURE_RANGE: &str = "operating_temperature_range";
/// Offer carrying the selling price.
pub const PURCHASABLE_OFFER: &str = "purchasable_offer";
/// List (compare-at) price.
pub const LIST_PRICE: &str = "list_price";
/// Main image locator.
pub const MAIN_IMAGE_LOCATOR: &str = "main_product_image_locator";

/// Number of secondary image locator slots.
pub const OTHER_IMAGE_SLOTS: usize = 8;

/// Maximum number of images a listing can carry (main + secondary slots).
pub const MAX_IMAGE_LOCATORS: usize = OTHER_IMAGE_SLOTS + 1;

/// Language tag used for text attributes.
pub const LANGUAGE_TAG: &str = "en_US";

/// Name of the n-th (1-based) secondary image locator.
#[must_use]
pub fn other_image_locator(slot: usize) -> String {
    format!("other_product_image_locator_{slot}")
}

/// All image locator attribute names, main first.
#[must_use]
pub fn image_locators() -> Vec<String> {
    std::iter::once(MAIN_IMAGE_LOCATOR.to_string())
        .chain((1..=OTHER_IMAGE_SLOTS).map(other_image_locator))
        .collect()
}

/// Entries of an attribute, or an empty slice when absent or malformed.
#[must_use]
pub fn entries<'a>(attributes: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    attributes
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// The `value` of the first entry of an attribute.
#[must_use]
pub fn first_value<'a>(attributes: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entries(attributes, key).first()?.get("value")
}

/// The `value` of every entry of an attribute, in order.
#[must_use]
pub fn all_values<'a>(attributes: &'a Map<String, Value>, key: &str) -> Vec<&'a Value> {
    entries(attributes, key)
        .iter()
        .filter_map(|entry| entry.get("value"))
        .collect()
}

/// Wraps a text value for the given marketplace.
#[must_use]
pub fn text_entry(value: &str, marketplace_id: &str) -> Value {
    json!({
        "value": value,
        "language_tag": LANGUAGE_TAG,
        "marketplace_id": marketplace_id,
    })
}

/// Wraps a non-text value for the given marketplace.
#[must_use]
pub fn value_entry(value: Value, marketplace_id: &str) -> Value {
    json!({
        "value": value,
        "marketplace_id": marketplace_id,
    })
}

/// Wraps a measured value (`{value, unit}`) for the given marketplace.
#[must_use]
pub fn measured_entry(value: f64, unit: &str, marketplace_id: &str) -> Value {
    json!({
        "value": value,
        "unit": unit,
        "marketplace_id": marketplace_id,
    })
}

/// Wraps an image URL for the given marketplace.
#[must_use]
pub fn image_entry(url: &str, marketplace_id: &str) -> Value {
    json!({
        "media_location": url,
        "marketplace_id": marketplace_id,
    })
}

/// Offer entry carrying the selling price.
#[must_use]
pub fn offer_entry(price: f64, currency: &str, marketplace_id: &str) -> Value {
    json!({
        "currency": currency,
        "marketplace_id": marketplace_id,
        "our_price": [{ "schedule": [{ "value_with_tax": price }] }],
    })
}

/// List price entry.
#[must_use]
pub fn list_price_entry(price: f64, currency: &str, marketplace_id: &str) -> Value {
    json!({
        "currency": currency,
        "value": price,
        "marketplace_id": marketplace_id,
    })
}

/// Selling price from a `purchasable_offer` attribute.
#[must_use]
pub fn offer_price(attributes: &Map<String, Value>) -> Option<&Value> {
    entries(attributes, PURCHASABLE_OFFER)
        .first()?
        .get("our_price")?
        .get(0)?
        .get("schedule")?
        .get(0)?
        .get("value_with_tax")
}

/// Number of image locator attributes that carry a media location.
#[must_use]
pub fn image_count(attributes: &Map<String, Value>) -> usize {
    image_locators()
        .iter()
        .filter(|key| {
            entries(attributes, key)
                .first()
                .and_then(|e| e.get("media_location"))
                .and_then(Value::as_str)
                .is_some_and(|url| !url.trim().is_empty())
        })
        .count()
}
