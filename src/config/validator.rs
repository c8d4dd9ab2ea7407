//! Configuration validation for product documents.
//!
//! The validator works on the generic parsed document rather than on the
//! typed [`ProductConfig`](super::ProductConfig): every field goes through a
//! presence check, a type check and finally a range, pattern or enumeration
//! check. Problems are accumulated across all sections so a single run
//! reports everything that needs fixing.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::debug;

use super::catalog::{self, Length, CONNECTOR_TYPES, WIRE_GAUGES};
use crate::listing::attributes::MAX_IMAGE_LOCATORS;
use crate::media::resolve_image;

/// Accepted image file extensions (lowercase, without the dot).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const SKU_LEN: (usize, usize) = (3, 40);
const TITLE_LEN: (usize, usize) = (10, 200);
const DESCRIPTION_LEN: (usize, usize) = (50, 2000);
const PIN_COUNT: (i64, i64) = (2, 500);
const PRICE: (f64, f64) = (0.01, 10_000.0);
const IMAGE_COUNT: (usize, usize) = (1, 10);
const KEYWORD_COUNT: (usize, usize) = (3, 50);
const BULLET_COUNT: (usize, usize) = (3, 5);
const BULLET_MAX_LEN: usize = 255;

/// Validator for product configuration documents.
#[derive(Debug)]
pub struct ConfigValidator {
    /// Directory relative image paths are resolved against.
    base_dir: PathBuf,
}

/// Validation result containing all errors found.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Dotted path of the field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
    /// The offending value, when it helps diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Per-image outcome while file checks are in flight.
enum ImageCheck {
    Failed(ValidationError),
    Pending {
        field: String,
        raw: String,
        handle: JoinHandle<std::result::Result<(), String>>,
    },
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Creates a validator resolving relative image paths against the
    /// current directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }

    /// Sets the directory relative image paths are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Validates a parsed configuration document.
    ///
    /// Never fails: malformed input becomes validation errors, including
    /// filesystem failures while checking images.
    pub async fn validate(&self, document: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();

        let Some(root) = document.as_object() else {
            result.errors.push(ValidationError::with_value(
                "root",
                "Configuration must be a mapping of sections",
                document.clone(),
            ));
            return result;
        };

        if let Some(product) = section(root, "product", &mut result) {
            Self::validate_product(product, &mut result);
        }
        if let Some(specs) = section(root, "specifications", &mut result) {
            Self::validate_specifications(specs, &mut result);
        }
        if let Some(pricing) = section(root, "pricing", &mut result) {
            Self::validate_pricing(pricing, &mut result);
        }
        self.validate_images(root.get("images"), &mut result).await;
        if let Some(amazon) = section(root, "amazon", &mut result) {
            Self::validate_amazon(amazon, &mut result);
        }

        Self::check_cross_field(root, &mut result);

        debug!(
            "Validation finished with {} error(s) and {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    /// Validates the `product` section.
    fn validate_product(product: &Map<String, Value>, result: &mut ValidationResult) {
        if let Some(sku) = required_str(product, "product", "sku", result)
            && !is_valid_sku(sku)
        {
            result.errors.push(ValidationError::with_value(
                "product.sku",
                format!(
                    "SKU must be {}-{} characters of A-Z, 0-9, '-' or '_'",
                    SKU_LEN.0, SKU_LEN.1
                ),
                Value::from(sku),
            ));
        }

        if let Some(title) = required_str(product, "product", "title", result) {
            let len = title.chars().count();
            if !(TITLE_LEN.0..=TITLE_LEN.1).contains(&len) {
                result.errors.push(ValidationError::with_value(
                    "product.title",
                    format!(
                        "Title must be {}-{} characters (got {len})",
                        TITLE_LEN.0, TITLE_LEN.1
                    ),
                    Value::from(title),
                ));
            } else if let Some(bad) = title.chars().find(|c| !is_title_char(*c)) {
                result.errors.push(ValidationError::with_value(
                    "product.title",
                    format!("Title contains a disallowed character '{bad}'"),
                    Value::from(title),
                ));
            }
        }

        if let Some(description) = required_str(product, "product", "description", result) {
            let len = description.chars().count();
            if !(DESCRIPTION_LEN.0..=DESCRIPTION_LEN.1).contains(&len) {
                result.errors.push(ValidationError::new(
                    "product.description",
                    format!(
                        "Description must be {}-{} characters (got {len})",
                        DESCRIPTION_LEN.0, DESCRIPTION_LEN.1
                    ),
                ));
            }
        }
    }

    /// Validates the `specifications` section.
    fn validate_specifications(specs: &Map<String, Value>, result: &mut ValidationResult) {
        if let Some(pins) = required_int(specs, "specifications", "pin_count", result)
            && !(PIN_COUNT.0..=PIN_COUNT.1).contains(&pins)
        {
            result.errors.push(ValidationError::with_value(
                "specifications.pin_count",
                format!("Pin count must be between {} and {}", PIN_COUNT.0, PIN_COUNT.1),
                Value::from(pins),
            ));
        }

        if let Some(gauge) = required_str(specs, "specifications", "wire_gauge", result)
            && !WIRE_GAUGES.contains(&gauge)
        {
            result.errors.push(ValidationError::with_value(
                "specifications.wire_gauge",
                format!("Wire gauge must be one of: {}", WIRE_GAUGES.join(", ")),
                Value::from(gauge),
            ));
        }

        if let Some(length) = required_str(specs, "specifications", "length", result)
            && Length::parse(length).is_none()
        {
            result.errors.push(ValidationError::with_value(
                "specifications.length",
                "Length must be '<number> <unit>' with unit inches/in, feet/ft, mm, cm or meters/m",
                Value::from(length),
            ));
        }

        if let Some(connector) = required_str(specs, "specifications", "connector_type", result)
            && !CONNECTOR_TYPES.contains(&connector)
        {
            result.errors.push(ValidationError::with_value(
                "specifications.connector_type",
                "Unknown connector type",
                Value::from(connector),
            ));
        }

        for attribute in ["current_rating", "voltage_rating", "temperature_range"] {
            optional_str(specs, "specifications", attribute, result);
        }
    }

    /// Validates the `pricing` section.
    fn validate_pricing(pricing: &Map<String, Value>, result: &mut ValidationResult) {
        if let Some(price) = required_number(pricing, "pricing", "price", result) {
            check_price("pricing.price", price, result);
        }

        if let Some(compare_at) = optional_number(pricing, "pricing", "compare_at_price", result) {
            check_price("pricing.compare_at_price", compare_at, result);
        }
    }

    /// Validates the `images` list, checking files concurrently.
    async fn validate_images(&self, images: Option<&Value>, result: &mut ValidationResult) {
        let entries = match images {
            None | Some(Value::Null) => {
                result
                    .errors
                    .push(ValidationError::new("images", "Missing required field"));
                return;
            }
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                result.errors.push(ValidationError::with_value(
                    "images",
                    "Images must be a list of file paths",
                    other.clone(),
                ));
                return;
            }
        };

        if !(IMAGE_COUNT.0..=IMAGE_COUNT.1).contains(&entries.len()) {
            result.errors.push(ValidationError::new(
                "images",
                format!(
                    "Between {} and {} images are required (got {})",
                    IMAGE_COUNT.0,
                    IMAGE_COUNT.1,
                    entries.len()
                ),
            ));
        }

        let checks: Vec<ImageCheck> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let field = format!("images[{i}]");
                let Some(raw) = entry.as_str() else {
                    return ImageCheck::Failed(ValidationError::with_value(
                        field,
                        "Image entry must be a file path string",
                        entry.clone(),
                    ));
                };

                if !has_image_extension(raw) {
                    return ImageCheck::Failed(ValidationError::with_value(
                        field,
                        "Image must be a .jpg, .jpeg or .png file",
                        Value::from(raw),
                    ));
                }

                let path = resolve_image(&self.base_dir, raw);
                ImageCheck::Pending {
                    field,
                    raw: raw.to_string(),
                    handle: tokio::spawn(check_image_file(path)),
                }
            })
            .collect();

        // Joined in input order so errors are reported in list order.
        for check in checks {
            match check {
                ImageCheck::Failed(error) => result.errors.push(error),
                ImageCheck::Pending { field, raw, handle } => {
                    let outcome = handle
                        .await
                        .unwrap_or_else(|e| Err(format!("Image check did not complete: {e}")));
                    if let Err(message) = outcome {
                        result
                            .errors
                            .push(ValidationError::with_value(field, message, Value::from(raw)));
                    }
                }
            }
        }
    }

    /// Validates the `amazon` section.
    fn validate_amazon(amazon: &Map<String, Value>, result: &mut ValidationResult) {
        if let Some(category) = required_str(amazon, "amazon", "category", result)
            && catalog::find_category(category).is_none()
        {
            let known: Vec<&str> = catalog::CATEGORIES.iter().map(|c| c.key).collect();
            result.errors.push(ValidationError::with_value(
                "amazon.category",
                format!("Category must be one of: {}", known.join(", ")),
                Value::from(category),
            ));
        }

        if let Some(keywords) = required_array(amazon, "amazon", "search_keywords", result) {
            if !(KEYWORD_COUNT.0..=KEYWORD_COUNT.1).contains(&keywords.len()) {
                result.errors.push(ValidationError::new(
                    "amazon.search_keywords",
                    format!(
                        "Between {} and {} search keywords are required (got {})",
                        KEYWORD_COUNT.0,
                        KEYWORD_COUNT.1,
                        keywords.len()
                    ),
                ));
            }
            for (i, keyword) in keywords.iter().enumerate() {
                if !keyword.is_string() {
                    result.errors.push(ValidationError::with_value(
                        format!("amazon.search_keywords[{i}]"),
                        "Search keyword must be a string",
                        keyword.clone(),
                    ));
                }
            }
        }

        if let Some(bullets) = required_array(amazon, "amazon", "bullet_points", result) {
            if !(BULLET_COUNT.0..=BULLET_COUNT.1).contains(&bullets.len()) {
                result.errors.push(ValidationError::new(
                    "amazon.bullet_points",
                    format!(
                        "Between {} and {} bullet points are required (got {})",
                        BULLET_COUNT.0,
                        BULLET_COUNT.1,
                        bullets.len()
                    ),
                ));
            }
            for (i, bullet) in bullets.iter().enumerate() {
                let field = format!("amazon.bullet_points[{i}]");
                match bullet.as_str() {
                    None => result.errors.push(ValidationError::with_value(
                        field,
                        "Bullet point must be a string",
                        bullet.clone(),
                    )),
                    Some(text) if text.chars().count() > BULLET_MAX_LEN => {
                        result.errors.push(ValidationError::new(
                            field,
                            format!("Bullet point exceeds {BULLET_MAX_LEN} characters"),
                        ));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    /// Cross-section business rules. Only ever emits warnings.
    fn check_cross_field(root: &Map<String, Value>, result: &mut ValidationResult) {
        let pricing = root.get("pricing").and_then(Value::as_object);
        let specs = root.get("specifications").and_then(Value::as_object);
        let product = root.get("product").and_then(Value::as_object);
        let amazon = root.get("amazon").and_then(Value::as_object);

        let price = pricing.and_then(|p| p.get("price")).and_then(Value::as_f64);
        let compare_at = pricing
            .and_then(|p| p.get("compare_at_price"))
            .and_then(Value::as_f64);
        if let (Some(price), Some(compare_at)) = (price, compare_at)
            && compare_at <= price
        {
            result.warnings.push(format!(
                "pricing.compare_at_price: Compare-at price ({compare_at:.2}) is not greater \
                 than price ({price:.2}); no discount will be shown"
            ));
        }

        let images = root.get("images").and_then(Value::as_array).map_or(0, Vec::len);
        if images > MAX_IMAGE_LOCATORS {
            result.warnings.push(format!(
                "images: Only the first {MAX_IMAGE_LOCATORS} of {images} images are submitted"
            ));
        }

        let category = amazon
            .and_then(|a| a.get("category"))
            .and_then(Value::as_str)
            .and_then(catalog::find_category);
        if let Some(category) = category {
            for attribute in category.recommended {
                let provided = specs
                    .and_then(|s| s.get(attribute.key()))
                    .and_then(Value::as_str)
                    .is_some_and(|v| !v.trim().is_empty());
                if !provided {
                    result.warnings.push(format!(
                        "specifications.{}: Recommended for category '{}' but not provided",
                        attribute.key(),
                        category.key
                    ));
                }
            }
        }

        let Some(sku) = product.and_then(|p| p.get("sku")).and_then(Value::as_str) else {
            return;
        };

        if let Some(pins) = specs.and_then(|s| s.get("pin_count")).and_then(Value::as_i64)
            && !sku.contains(&pins.to_string())
        {
            result.warnings.push(format!(
                "product.sku: SKU '{sku}' does not include the pin count ({pins})"
            ));
        }

        let gauge = specs
            .and_then(|s| s.get("wire_gauge"))
            .and_then(Value::as_str)
            .and_then(catalog::gauge_number);
        if let Some(gauge) = gauge
            && !sku.contains(gauge)
        {
            result.warnings.push(format!(
                "product.sku: SKU '{sku}' does not include the wire gauge ({gauge})"
            ));
        }
    }
}

impl ValidationError {
    /// Creates an error without an offending value.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Creates an error carrying the offending value.
    #[must_use]
    pub fn with_value(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value),
        }
    }
}

/// Looks up a top-level section, reporting a missing or non-mapping section.
fn section<'a>(
    root: &'a Map<String, Value>,
    name: &str,
    result: &mut ValidationResult,
) -> Option<&'a Map<String, Value>> {
    match root.get(name) {
        None | Some(Value::Null) => {
            result
                .errors
                .push(ValidationError::new(name, "Missing required section"));
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            result.errors.push(ValidationError::with_value(
                name,
                "Section must be a mapping",
                other.clone(),
            ));
            None
        }
    }
}

/// Presence check. `null` counts as missing.
fn required<'a>(
    section: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<&'a Value> {
    match section.get(key) {
        None | Some(Value::Null) => {
            result.errors.push(ValidationError::new(
                format!("{prefix}.{key}"),
                "Missing required field",
            ));
            None
        }
        Some(value) => Some(value),
    }
}

fn required_str<'a>(
    section: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<&'a str> {
    let value = required(section, prefix, key, result)?;
    expect_str(value, prefix, key, result)
}

fn optional_str<'a>(
    section: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<&'a str> {
    match section.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => expect_str(value, prefix, key, result),
    }
}

fn expect_str<'a>(
    value: &'a Value,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<&'a str> {
    if let Some(s) = value.as_str() {
        Some(s)
    } else {
        result.errors.push(ValidationError::with_value(
            format!("{prefix}.{key}"),
            "Must be a string",
            value.clone(),
        ));
        None
    }
}

fn required_int(
    section: &Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<i64> {
    let value = required(section, prefix, key, result)?;
    if let Some(n) = value.as_i64() {
        Some(n)
    } else {
        result.errors.push(ValidationError::with_value(
            format!("{prefix}.{key}"),
            "Must be an integer",
            value.clone(),
        ));
        None
    }
}

fn required_number(
    section: &Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<f64> {
    let value = required(section, prefix, key, result)?;
    expect_number(value, prefix, key, result)
}

fn optional_number(
    section: &Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<f64> {
    match section.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => expect_number(value, prefix, key, result),
    }
}

fn expect_number(
    value: &Value,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        Some(n)
    } else {
        result.errors.push(ValidationError::with_value(
            format!("{prefix}.{key}"),
            "Must be a number",
            value.clone(),
        ));
        None
    }
}

fn required_array<'a>(
    section: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    result: &mut ValidationResult,
) -> Option<&'a Vec<Value>> {
    let value = required(section, prefix, key, result)?;
    if let Some(items) = value.as_array() {
        Some(items)
    } else {
        result.errors.push(ValidationError::with_value(
            format!("{prefix}.{key}"),
            "Must be a list",
            value.clone(),
        ));
        None
    }
}

fn check_price(field: &str, price: f64, result: &mut ValidationResult) {
    if !(PRICE.0..=PRICE.1).contains(&price) {
        result.errors.push(ValidationError::with_value(
            field,
            format!("Price must be between {:.2} and {:.2}", PRICE.0, PRICE.1),
            Value::from(price),
        ));
    }
}

/// Checks that an image exists, is a regular file and can be opened.
async fn check_image_file(path: PathBuf) -> std::result::Result<(), String> {
    let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            format!("Image file not found: {}", path.display())
        } else {
            format!("Cannot access image file {}: {e}", path.display())
        }
    })?;

    if !metadata.is_file() {
        return Err(format!("Image path is not a file: {}", path.display()));
    }

    tokio::fs::File::open(&path)
        .await
        .map_err(|e| format!("Image file is not readable: {e}"))?;

    Ok(())
}

fn has_image_extension(raw: &str) -> bool {
    Path::new(raw)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// SKUs are 3-40 characters of uppercase letters, digits, hyphen or underscore.
fn is_valid_sku(sku: &str) -> bool {
    (SKU_LEN.0..=SKU_LEN.1).contains(&sku.len())
        && sku
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

const fn is_title_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '-' | '_' | ',' | '.' | '(' | ')' | '/' | '&' | '+' | '\'' | '"' | '#' | ':' | '%'
        )
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(value) = &self.value {
            write!(f, " (got {value})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn image_dir() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("a.jpg"), b"\xFF\xD8\xFF").expect("write image");
        std::fs::write(dir.path().join("b.png"), b"\x89PNG").expect("write image");
        dir
    }

    fn valid_document() -> Value {
        json!({
            "product": {
                "title": "X".repeat(10),
                "sku": "AB-123",
                "description": "Y".repeat(60),
            },
            "specifications": {
                "pin_count": 4,
                "wire_gauge": "18 AWG",
                "length": "12 inches",
                "connector_type": "JST Connector",
            },
            "pricing": { "price": 9.99 },
            "images": ["a.jpg"],
            "amazon": {
                "category": "electronics-components",
                "search_keywords": ["a", "b", "c"],
                "bullet_points": ["p1", "p2", "p3"],
            },
        })
    }

    async fn validate(document: &Value, dir: &TempDir) -> ValidationResult {
        ConfigValidator::new()
            .with_base_dir(dir.path())
            .validate(document)
            .await
    }

    fn errors_on<'a>(result: &'a ValidationResult, field: &str) -> Vec<&'a ValidationError> {
        result.errors.iter().filter(|e| e.field == field).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_valid_configuration() {
        let dir = image_dir();
        let result = validate(&valid_document(), &dir).await;

        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert_eq!(result.error_count(), 0);
        assert!(result.warnings.iter().all(|w| !w.is_empty()));
    }

    #[tokio::test]
    async fn test_root_must_be_mapping() {
        let dir = image_dir();
        for doc in [json!(null), json!([1, 2]), json!("product")] {
            let result = validate(&doc, &dir).await;
            assert_eq!(result.error_count(), 1);
            assert_eq!(result.errors[0].field, "root");
            assert!(result.warnings.is_empty());
        }
    }

    #[tokio::test]
    async fn test_errors_accumulate_across_sections() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["product"]["sku"] = json!("lowercase");
        doc["specifications"]["pin_count"] = json!(1);
        doc["pricing"]["price"] = json!(0);
        doc["images"] = json!(["missing.jpg"]);
        doc["amazon"]["category"] = json!("garden");

        let result = validate(&doc, &dir).await;

        assert_eq!(result.error_count(), 5, "{:?}", result.errors);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "product.sku",
                "specifications.pin_count",
                "pricing.price",
                "images[0]",
                "amazon.category"
            ]
        );
    }

    #[tokio::test]
    async fn test_validation_is_idempotent() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["specifications"]["length"] = json!("24");
        let validator = ConfigValidator::new().with_base_dir(dir.path());

        let first = validator.validate(&doc).await;
        let second = validator.validate(&doc).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_connector_type_enumeration_is_closed() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["specifications"]["connector_type"] = json!("Mini-Fit Jr");

        let result = validate(&doc, &dir).await;
        let errors = errors_on(&result, "specifications.connector_type");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].value, Some(json!("Mini-Fit Jr")));
    }

    #[tokio::test]
    async fn test_images_beyond_locator_slots_warn() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["images"] = json!(vec!["a.jpg"; 10]);

        let result = validate(&doc, &dir).await;
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("images:") && w.contains("first 9 of 10"))
        );
    }

    #[tokio::test]
    async fn test_warnings_do_not_affect_validity() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["pricing"]["compare_at_price"] = json!(5.0);

        let result = validate(&doc, &dir).await;
        assert!(result.is_valid());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("pricing.compare_at_price"))
        );
        assert_eq!(result.is_valid(), result.error_count() == 0);
    }

    #[tokio::test]
    async fn test_wire_gauge_enumeration_boundary() {
        let dir = image_dir();
        let mut doc = valid_document();

        doc["specifications"]["wire_gauge"] = json!("19 AWG");
        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "specifications.wire_gauge").len(), 1);
        assert_eq!(result.error_count(), 1);

        doc["specifications"]["wire_gauge"] = json!("18 AWG");
        let result = validate(&doc, &dir).await;
        assert!(errors_on(&result, "specifications.wire_gauge").is_empty());
    }

    #[tokio::test]
    async fn test_pin_count_range_boundary() {
        let dir = image_dir();
        let mut doc = valid_document();

        for (pins, expect_error) in [(1, true), (2, false), (500, false), (501, true)] {
            doc["specifications"]["pin_count"] = json!(pins);
            let result = validate(&doc, &dir).await;
            assert_eq!(
                !errors_on(&result, "specifications.pin_count").is_empty(),
                expect_error,
                "pin_count = {pins}"
            );
        }
    }

    #[tokio::test]
    async fn test_pin_count_must_be_integer() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["specifications"]["pin_count"] = json!("four");

        let result = validate(&doc, &dir).await;
        let errors = errors_on(&result, "specifications.pin_count");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Must be an integer");
    }

    #[tokio::test]
    async fn test_length_pattern() {
        let dir = image_dir();
        let mut doc = valid_document();

        for (length, ok) in [("24 inches", true), ("12 ft", true), ("30 cm", true), ("24", false)]
        {
            doc["specifications"]["length"] = json!(length);
            let result = validate(&doc, &dir).await;
            assert_eq!(
                errors_on(&result, "specifications.length").is_empty(),
                ok,
                "length = {length}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_field_skips_further_checks() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["product"].as_object_mut().unwrap().remove("title");

        let result = validate(&doc, &dir).await;
        let errors = errors_on(&result, "product.title");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Missing required field");
    }

    #[tokio::test]
    async fn test_missing_section_reports_once() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc.as_object_mut().unwrap().remove("pricing");

        let result = validate(&doc, &dir).await;
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors[0].field, "pricing");
    }

    #[tokio::test]
    async fn test_title_character_set() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["product"]["title"] = json!("Harness <script> 4-pin");

        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "product.title").len(), 1);
    }

    #[tokio::test]
    async fn test_image_errors_preserve_order() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["images"] = json!(["nope-1.jpg", "a.jpg", "photo.gif", "b.png", "nope-2.png"]);

        let result = validate(&doc, &dir).await;
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["images[0]", "images[2]", "images[4]"]);
    }

    #[tokio::test]
    async fn test_image_count_bounds() {
        let dir = image_dir();
        let mut doc = valid_document();

        doc["images"] = json!([]);
        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "images").len(), 1);

        doc["images"] = json!(vec!["a.jpg"; 11]);
        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "images").len(), 1);
        assert_eq!(result.error_count(), 1);
    }

    #[tokio::test]
    async fn test_directory_is_not_an_image() {
        let dir = image_dir();
        std::fs::create_dir(dir.path().join("folder.jpg")).expect("create dir");
        let mut doc = valid_document();
        doc["images"] = json!(["folder.jpg"]);

        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "images[0]").len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_image_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = image_dir();
        let locked = dir.path().join("locked.jpg");
        std::fs::write(&locked, b"\xFF\xD8\xFF").expect("write image");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000))
            .expect("chmod");

        // Permission bits do not apply to root.
        if std::fs::File::open(&locked).is_ok() {
            return;
        }

        let mut doc = valid_document();
        doc["images"] = json!(["a.jpg", "locked.jpg"]);

        let result = validate(&doc, &dir).await;
        let errors = errors_on(&result, "images[1]");
        assert_eq!(errors.len(), 1, "{:?}", result.errors);
        assert!(errors[0].message.contains("not readable"));
        assert_eq!(result.error_count(), 1);
    }

    #[tokio::test]
    async fn test_bullet_and_keyword_limits() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["amazon"]["search_keywords"] = json!(["only", "two"]);
        doc["amazon"]["bullet_points"] = json!(["p1", "p2", "z".repeat(256)]);

        let result = validate(&doc, &dir).await;
        assert_eq!(errors_on(&result, "amazon.search_keywords").len(), 1);
        assert_eq!(errors_on(&result, "amazon.bullet_points[2]").len(), 1);
        assert_eq!(result.error_count(), 2);
    }

    #[tokio::test]
    async fn test_recommended_attribute_warnings() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["specifications"]["current_rating"] = json!("3A");

        let result = validate(&doc, &dir).await;
        assert!(result.is_valid());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("specifications.voltage_rating"))
        );
        assert!(
            !result
                .warnings
                .iter()
                .any(|w| w.starts_with("specifications.current_rating"))
        );
    }

    #[tokio::test]
    async fn test_sku_convention_warnings() {
        let dir = image_dir();
        let mut doc = valid_document();
        doc["product"]["sku"] = json!("WH-4P-18AWG");

        let result = validate(&doc, &dir).await;
        assert!(!result.warnings.iter().any(|w| w.starts_with("product.sku")));

        doc["product"]["sku"] = json!("WH-XX");
        let result = validate(&doc, &dir).await;
        assert_eq!(
            result
                .warnings
                .iter()
                .filter(|w| w.starts_with("product.sku"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_starter_template_is_clean() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir(dir.path().join("images")).expect("create images dir");
        for name in ["front.jpg", "connector.jpg"] {
            std::fs::write(dir.path().join("images").join(name), b"\xFF\xD8\xFF")
                .expect("write image");
        }
        let document: Value =
            serde_yaml::from_str(include_str!("../../templates/product.yaml")).expect("template");

        let result = validate(&document, &dir).await;
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_valid_sku() {
        assert!(is_valid_sku("AB-123"));
        assert!(is_valid_sku("WH_4P_18"));
        assert!(!is_valid_sku("AB"));
        assert!(!is_valid_sku("ab-123"));
        assert!(!is_valid_sku("AB 123"));
        assert!(!is_valid_sku(&"A".repeat(41)));
    }

    #[test]
    fn test_image_extension() {
        assert!(has_image_extension("photos/main.JPG"));
        assert!(has_image_extension("b.jpeg"));
        assert!(!has_image_extension("b.gif"));
        assert!(!has_image_extension("jpg"));
    }
}
