//! Selling Partner API types.
//!
//! This module defines the response shapes read from the Listings Items API.
//! Listing bodies themselves stay as `serde_json::Value`; only the envelopes
//! the tool acts on are typed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Submission status meaning the request was rejected.
pub const STATUS_INVALID: &str = "INVALID";

/// Issue severity that blocks a submission.
pub const SEVERITY_ERROR: &str = "ERROR";

/// Response to a put, patch or delete request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    /// Seller SKU the submission applies to.
    #[serde(default)]
    pub sku: String,
    /// `ACCEPTED` or `INVALID`.
    #[serde(default)]
    pub status: String,
    /// Submission identifier.
    #[serde(default)]
    pub submission_id: String,
    /// Issues raised by the marketplace.
    #[serde(default)]
    pub issues: Vec<ListingIssue>,
}

/// A single issue attached to a submission or listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingIssue {
    /// Issue code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// `ERROR`, `WARNING` or `INFO`.
    #[serde(default)]
    pub severity: String,
    /// Attributes the issue refers to.
    #[serde(default)]
    pub attribute_names: Vec<String>,
}

impl ListingIssue {
    /// Returns true if the issue blocks the submission.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case(SEVERITY_ERROR)
    }
}

impl std::fmt::Display for ListingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.attribute_names.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(
                f,
                "{}: {} ({})",
                self.code,
                self.message,
                self.attribute_names.join(", ")
            )
        }
    }
}

impl SubmissionResponse {
    /// Returns true if the marketplace rejected the submission.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_INVALID)
            || self.issues.iter().any(ListingIssue::is_error)
    }

    /// Rendered blocking issues.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        let errors: Vec<String> = self
            .issues
            .iter()
            .filter(|i| i.is_error())
            .map(ToString::to_string)
            .collect();

        if errors.is_empty() && self.is_rejected() {
            vec![format!("submission {} was rejected", self.submission_id)]
        } else {
            errors
        }
    }

    /// Returns true if there are non-blocking issues.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| !i.is_error())
    }
}

/// Short view of a listing, as shown by `list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSummary {
    /// Seller SKU.
    pub sku: String,
    /// ASIN, once assigned.
    pub asin: Option<String>,
    /// Listing title.
    pub title: Option<String>,
    /// Product type.
    pub product_type: Option<String>,
    /// Listing statuses, e.g. `BUYABLE`.
    pub status: Vec<String>,
}

impl ListingSummary {
    /// Builds a summary from a `searchListingsItems` item.
    ///
    /// Returns `None` when the item carries no SKU.
    #[must_use]
    pub fn from_item(item: &Value) -> Option<Self> {
        let sku = item.get("sku")?.as_str()?.to_string();
        let summary = item.get("summaries").and_then(|s| s.get(0));
        let text = |key: &str| {
            summary
                .and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .map(String::from)
        };

        Some(Self {
            sku,
            asin: text("asin"),
            title: text("itemName"),
            product_type: text("productType"),
            status: summary
                .and_then(|s| s.get("status"))
                .and_then(Value::as_array)
                .map(|s| {
                    s.iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Login with Amazon token response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// Bearer token for SP-API calls.
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

const fn default_expires_in() -> i64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_rejected_by_status() {
        let response: SubmissionResponse = serde_json::from_value(json!({
            "sku": "WH-4",
            "status": "INVALID",
            "submissionId": "abc",
            "issues": []
        }))
        .unwrap();

        assert!(response.is_rejected());
        assert_eq!(response.error_messages(), vec!["submission abc was rejected"]);
    }

    #[test]
    fn test_submission_rejected_by_error_issue() {
        let response: SubmissionResponse = serde_json::from_value(json!({
            "sku": "WH-4",
            "status": "ACCEPTED",
            "submissionId": "abc",
            "issues": [
                {
                    "code": "90220",
                    "message": "missing",
                    "severity": "ERROR",
                    "attributeNames": ["item_name"]
                },
                { "code": "18027", "message": "note", "severity": "WARNING" }
            ]
        }))
        .unwrap();

        assert!(response.is_rejected());
        assert!(response.has_warnings());
        assert_eq!(response.error_messages(), vec!["90220: missing (item_name)"]);
    }

    #[test]
    fn test_accepted_submission() {
        let response: SubmissionResponse = serde_json::from_value(json!({
            "sku": "WH-4",
            "status": "ACCEPTED",
            "submissionId": "x"
        }))
        .unwrap();
        assert!(!response.is_rejected());
        assert!(response.error_messages().is_empty());
    }

    #[test]
    fn test_summary_from_item() {
        let item = json!({
            "sku": "WH-4",
            "summaries": [{
                "asin": "B000TEST",
                "itemName": "Harness",
                "productType": "ELECTRONIC_COMPONENT",
                "status": ["BUYABLE", "DISCOVERABLE"]
            }]
        });

        let summary = ListingSummary::from_item(&item).unwrap();
        assert_eq!(summary.asin.as_deref(), Some("B000TEST"));
        assert_eq!(summary.status, vec!["BUYABLE", "DISCOVERABLE"]);
        assert!(ListingSummary::from_item(&json!({ "summaries": [] })).is_none());
    }
}
