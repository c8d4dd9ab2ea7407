//! Change detection between a published listing and a desired configuration.
//!
//! Both sides are projected into a [`ListingSnapshot`] and compared field by
//! field in a fixed order. Only fields whose normalized values differ are
//! reported.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::config::ProductConfig;

use super::normalize::EMPTY_PLACEHOLDER;
use super::snapshot::ListingSnapshot;

/// Kind of a field-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Both sides have a value and they differ.
    Modified,
    /// Only the desired side has a value.
    Added,
    /// Only the published side has a value.
    Removed,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Modified => "modified",
            Self::Added => "added",
            Self::Removed => "removed",
        };
        f.write_str(label)
    }
}

/// A single field that differs between the published and desired listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Tracked field name, e.g. `title` or `bullet_point_2`.
    pub field: String,
    /// Published value.
    pub old_value: Option<String>,
    /// Desired value.
    pub new_value: Option<String>,
    /// Kind of change.
    pub change_type: ChangeType,
}

impl FieldChange {
    /// Published value for display.
    #[must_use]
    pub fn old_display(&self) -> &str {
        self.old_value.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
    }

    /// Desired value for display.
    #[must_use]
    pub fn new_display(&self) -> &str {
        self.new_value.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
    }
}

/// Stateless field-level change detector.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Creates a new detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the changes that would turn `remote` into `desired`.
    ///
    /// A response that is not a JSON object cannot be compared; the result is
    /// then empty and a warning is logged.
    #[must_use]
    pub fn detect_changes(&self, remote: &Value, desired: &ProductConfig) -> Vec<FieldChange> {
        let Some(old) = ListingSnapshot::from_remote(remote) else {
            warn!("Published listing is not an object, skipping comparison");
            return Vec::new();
        };

        let changes = Self::compare(&old, &ListingSnapshot::from_config(desired));
        debug!("Detected {} field change(s)", changes.len());
        changes
    }

    /// Compares two snapshots in tracked field order.
    #[must_use]
    pub fn compare(old: &ListingSnapshot, new: &ListingSnapshot) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        push_change(&mut changes, "title", old.title.as_deref(), new.title.as_deref());
        push_change(
            &mut changes,
            "description",
            old.description.as_deref(),
            new.description.as_deref(),
        );
        push_change(&mut changes, "price", old.price.as_deref(), new.price.as_deref());

        let bullets = old.bullet_points.len().max(new.bullet_points.len());
        for index in 0..bullets {
            push_change(
                &mut changes,
                &format!("bullet_point_{}", index + 1),
                old.bullet_points.get(index).and_then(Option::as_deref),
                new.bullet_points.get(index).and_then(Option::as_deref),
            );
        }

        push_change(
            &mut changes,
            "wire_gauge",
            old.wire_gauge.as_deref(),
            new.wire_gauge.as_deref(),
        );
        push_change(&mut changes, "length", old.length.as_deref(), new.length.as_deref());
        push_change(
            &mut changes,
            "connector_type",
            old.connector_type.as_deref(),
            new.connector_type.as_deref(),
        );
        push_change(&mut changes, "pin_count", old.pin_count.as_deref(), new.pin_count.as_deref());
        push_change(
            &mut changes,
            "current_rating",
            old.current_rating.as_deref(),
            new.current_rating.as_deref(),
        );
        push_change(
            &mut changes,
            "voltage_rating",
            old.voltage_rating.as_deref(),
            new.voltage_rating.as_deref(),
        );
        push_change(
            &mut changes,
            "temperature_range",
            old.temperature_range.as_deref(),
            new.temperature_range.as_deref(),
        );
        push_change(
            &mut changes,
            "search_keywords",
            old.search_keywords.as_deref(),
            new.search_keywords.as_deref(),
        );
        push_change(
            &mut changes,
            "image_count",
            old.image_count.as_deref(),
            new.image_count.as_deref(),
        );

        changes
    }
}

/// Records a change for `field` when the normalized values differ.
fn push_change(
    changes: &mut Vec<FieldChange>,
    field: &str,
    old: Option<&str>,
    new: Option<&str>,
) {
    let change_type = match (old, new) {
        (a, b) if a == b => return,
        (None, Some(_)) => ChangeType::Added,
        (Some(_), None) => ChangeType::Removed,
        _ => ChangeType::Modified,
    };

    debug!("Field {field} {change_type}");
    changes.push(FieldChange {
        field: field.to_string(),
        old_value: old.map(String::from),
        new_value: new.map(String::from),
        change_type,
    });
}
