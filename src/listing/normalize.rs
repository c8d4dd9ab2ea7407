//! Normalization helpers shared by both sides of a comparison.
//!
//! Every helper projects a value into its canonical comparable string, or
//! `None` when there is nothing there. Empty and whitespace-only strings are
//! treated as nothing.

use serde_json::Value;

use crate::config::catalog::{Length, LengthUnit};

/// Keywords beyond this many are never submitted to the marketplace.
pub const KEYWORD_SUBMISSION_CAP: usize = 5;

/// Delimiter used when a list is flattened into one comparable string.
pub const LIST_DELIMITER: &str = ", ";

/// Human-facing stand-in for a missing value.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Trimmed text, `None` when blank.
#[must_use]
pub fn text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed optional text, `None` when absent or blank.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value.and_then(text)
}

/// A number rendered without a trailing `.0`.
#[must_use]
pub fn number(value: f64) -> String {
    format!("{value}")
}

/// A price rendered with two decimals.
#[must_use]
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// A free-text length rendered as `"<value> <canonical-unit>"`.
///
/// Text that does not parse is compared as trimmed text.
#[must_use]
pub fn length(value: &str) -> Option<String> {
    Length::parse(value).map_or_else(|| text(value), |l| Some(l.to_string()))
}

/// A measured `{value, unit}` pair rendered like [`length`].
#[must_use]
pub fn length_parts(value: f64, unit: &str) -> String {
    let unit = LengthUnit::from_word(unit.trim())
        .map_or_else(|| unit.trim().to_ascii_lowercase(), |u| u.as_str().to_string());
    format!("{} {unit}", number(value))
}

/// Sorted, de-duplicated, trimmed entries joined with [`LIST_DELIMITER`].
#[must_use]
pub fn sorted_list<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries: Vec<String> = items
        .into_iter()
        .filter_map(|item| text(item.as_ref()))
        .collect();
    entries.sort();
    entries.dedup();

    (!entries.is_empty()).then(|| entries.join(LIST_DELIMITER))
}

/// A JSON scalar as comparable text: strings trimmed, numbers stringified.
#[must_use]
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => text(s),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_f64().map(number)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A JSON price (number or numeric string) with two decimals.
#[must_use]
pub fn scalar_price(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().map(price),
        Value::String(s) => s.trim().parse::<f64>().ok().map(price),
        _ => None,
    }
}

/// A count, `None` when zero.
#[must_use]
pub fn count(value: usize) -> Option<String> {
    (value > 0).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_trims_and_blanks_to_none() {
        assert_eq!(text("  Widget A "), Some(String::from("Widget A")));
        assert_eq!(text("   "), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_length_forms_agree() {
        assert_eq!(length("24 in"), Some(String::from("24 inches")));
        assert_eq!(length_parts(24.0, "Inches"), "24 inches");
        assert_eq!(length_parts(1.5, "m"), "1.5 meters");
        assert_eq!(length_parts(3.0, "furlongs"), "3 furlongs");
        assert_eq!(length("about a foot"), Some(String::from("about a foot")));
    }

    #[test]
    fn test_sorted_list_ignores_order_and_blanks() {
        assert_eq!(sorted_list(["c", "a", " b "]), sorted_list(["a", "b", "c"]));
        assert_eq!(sorted_list(["a", "", "a"]), Some(String::from("a")));
        assert_eq!(sorted_list(Vec::<String>::new()), None);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(scalar(&json!(4)), Some(String::from("4")));
        assert_eq!(scalar(&json!(4.5)), Some(String::from("4.5")));
        assert_eq!(scalar(&json!(" 5A ")), Some(String::from("5A")));
        assert_eq!(scalar(&json!(null)), None);
        assert_eq!(scalar(&json!({"value": 1})), None);
    }

    #[test]
    fn test_prices() {
        assert_eq!(scalar_price(&json!(19.9)), Some(String::from("19.90")));
        assert_eq!(scalar_price(&json!("19.99")), Some(String::from("19.99")));
        assert_eq!(scalar_price(&json!("n/a")), None);
        assert_eq!(price(9.99), "9.99");
    }

    #[test]
    fn test_count() {
        assert_eq!(count(0), None);
        assert_eq!(count(3), Some(String::from("3")));
    }
}
