//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::ValidationResult;
use crate::listing::{ChangeType, FieldChange, ListingSnapshot, PatchOp};
use crate::marketplace::{ListingSummary, SubmissionResponse};
use crate::workflow::{CreateOutcome, UpdateOutcome};

use super::commands::OutputFormat;

/// Widest value shown in a table cell.
const CELL_WIDTH: usize = 40;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Field change row for table display.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Published")]
    old: String,
    #[tabled(rename = "Desired")]
    new: String,
}

/// Listing row for table display.
#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "ASIN")]
    asin: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => Self::json(&ValidationJson::new(result, show_warnings)),
            OutputFormat::Text => {
                let mut output = String::new();

                if result.is_valid() {
                    let _ = writeln!(output, "{} Configuration is valid", "✓".green());
                } else {
                    let _ = writeln!(
                        output,
                        "{} Configuration has {} error(s):\n",
                        "✗".red(),
                        result.error_count()
                    );
                    for error in &result.errors {
                        let _ = writeln!(output, "   - {error}");
                    }
                }

                if show_warnings && !result.warnings.is_empty() {
                    let _ = write!(
                        output,
                        "\n{} {} warning(s):\n",
                        "⚠".yellow(),
                        result.warning_count()
                    );
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                } else if !result.warnings.is_empty() {
                    let _ = writeln!(
                        output,
                        "\n{} warning(s) hidden, use --warnings to show them",
                        result.warning_count()
                    );
                }

                output
            }
        }
    }

    /// Formats a change set.
    #[must_use]
    pub fn format_changes(&self, sku: &str, changes: &[FieldChange]) -> String {
        match self.format {
            OutputFormat::Json => Self::json(&serde_json::json!({
                "sku": sku,
                "change_count": changes.len(),
                "changes": changes,
            })),
            OutputFormat::Text => Self::format_changes_text(sku, changes),
        }
    }

    /// Formats a change set as text.
    fn format_changes_text(sku: &str, changes: &[FieldChange]) -> String {
        if changes.is_empty() {
            return format!(
                "{} Listing {sku} matches the configuration.\n",
                "✓".green()
            );
        }

        let rows: Vec<ChangeRow> = changes
            .iter()
            .map(|c| ChangeRow {
                field: c.field.clone(),
                change: Self::format_change_type(c.change_type),
                old: Self::truncate(c.old_display(), CELL_WIDTH),
                new: Self::truncate(c.new_display(), CELL_WIDTH),
            })
            .collect();

        let mut output = format!("\nChanges for {sku}\n\n");
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let count = |kind: ChangeType| changes.iter().filter(|c| c.change_type == kind).count();
        let _ = write!(
            output,
            "\nDiff: {} added, {} modified, {} removed\n",
            count(ChangeType::Added).to_string().green(),
            count(ChangeType::Modified).to_string().yellow(),
            count(ChangeType::Removed).to_string().red()
        );

        output
    }

    /// Formats the outcome of a create run.
    #[must_use]
    pub fn format_create(&self, outcome: &CreateOutcome) -> String {
        match self.format {
            OutputFormat::Json => Self::json(outcome),
            OutputFormat::Text => {
                let mut output = String::new();
                match &outcome.submission {
                    Some(submission) => {
                        let _ = writeln!(
                            output,
                            "{} Listing {} submitted ({})",
                            "✓".green(),
                            outcome.sku,
                            submission.submission_id
                        );
                        Self::push_issues(&mut output, submission);
                    }
                    None => {
                        let _ = writeln!(
                            output,
                            "Dry run: {} attribute(s) prepared for {} as {}",
                            outcome.request.attributes.len(),
                            outcome.sku,
                            outcome.request.product_type
                        );
                        for url in &outcome.image_urls {
                            let _ = writeln!(output, "   image: {url}");
                        }
                    }
                }
                output
            }
        }
    }

    /// Formats the outcome of an update run.
    #[must_use]
    pub fn format_update(&self, outcome: &UpdateOutcome) -> String {
        match self.format {
            OutputFormat::Json => Self::json(outcome),
            OutputFormat::Text => {
                if outcome.is_unchanged() {
                    return Self::format_changes_text(&outcome.sku, &outcome.changes);
                }

                let mut output = String::new();
                match &outcome.submission {
                    Some(submission) => {
                        let _ = writeln!(
                            output,
                            "{} Patched {} attribute(s) on {} ({})",
                            "✓".green(),
                            outcome.patches.len(),
                            outcome.sku,
                            submission.submission_id
                        );
                        Self::push_issues(&mut output, submission);
                    }
                    None => {
                        let _ = writeln!(output, "Dry run: patches for {}", outcome.sku);
                        for patch in &outcome.patches {
                            let op = match patch.op {
                                PatchOp::Replace => "~replace".yellow(),
                                PatchOp::Delete => "-delete".red(),
                            };
                            let _ = writeln!(output, "   {op} {}", patch.path);
                        }
                    }
                }
                output
            }
        }
    }

    /// Formats a published listing.
    #[must_use]
    pub fn format_listing(&self, sku: &str, listing: &Value) -> String {
        match self.format {
            OutputFormat::Json => Self::json(listing),
            OutputFormat::Text => {
                let snapshot = ListingSnapshot::from_remote(listing).unwrap_or_default();
                let asin = listing
                    .get("summaries")
                    .and_then(|s| s.get(0))
                    .and_then(|s| s.get("asin"))
                    .and_then(Value::as_str)
                    .unwrap_or("-");

                let mut output = format!("\nListing {sku} ({asin})\n\n");
                let fields = [
                    ("Title", &snapshot.title),
                    ("Price", &snapshot.price),
                    ("Wire gauge", &snapshot.wire_gauge),
                    ("Length", &snapshot.length),
                    ("Connector", &snapshot.connector_type),
                    ("Pins", &snapshot.pin_count),
                    ("Current", &snapshot.current_rating),
                    ("Voltage", &snapshot.voltage_rating),
                    ("Temperature", &snapshot.temperature_range),
                    ("Keywords", &snapshot.search_keywords),
                    ("Images", &snapshot.image_count),
                ];
                for (label, value) in fields {
                    let _ = writeln!(output, "   {label:<12} {}", value.as_deref().unwrap_or("-"));
                }
                for (i, bullet) in snapshot.bullet_points.iter().enumerate() {
                    let _ = writeln!(
                        output,
                        "   {:<12} {}",
                        format!("Bullet {}", i + 1),
                        bullet.as_deref().unwrap_or("-")
                    );
                }

                output
            }
        }
    }

    /// Formats a page of listings.
    #[must_use]
    pub fn format_listings(&self, listings: &[ListingSummary]) -> String {
        match self.format {
            OutputFormat::Json => Self::json(&listings),
            OutputFormat::Text => {
                if listings.is_empty() {
                    return String::from("   No listings found.\n");
                }

                let rows: Vec<ListingRow> = listings
                    .iter()
                    .map(|l| ListingRow {
                        sku: l.sku.clone(),
                        asin: l.asin.clone().unwrap_or_else(|| String::from("-")),
                        title: Self::truncate(l.title.as_deref().unwrap_or("-"), CELL_WIDTH),
                        status: if l.status.is_empty() {
                            "-".dimmed().to_string()
                        } else {
                            l.status.join(", ")
                        },
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Formats the outcome of a delete.
    #[must_use]
    pub fn format_deleted(&self, sku: &str, submission: Option<&SubmissionResponse>) -> String {
        match (self.format, submission) {
            (OutputFormat::Json, _) => Self::json(&serde_json::json!({
                "sku": sku,
                "deleted": submission.is_some(),
                "submission": submission,
            })),
            (OutputFormat::Text, Some(_)) => format!("{} Listing {sku} deleted\n", "✓".green()),
            (OutputFormat::Text, None) => format!("Dry run: listing {sku} would be deleted\n"),
        }
    }

    /// Appends non-blocking submission issues.
    fn push_issues(output: &mut String, submission: &SubmissionResponse) {
        if submission.has_warnings() {
            let _ = writeln!(output, "\n{} Marketplace notes:", "⚠".yellow());
            for issue in &submission.issues {
                let _ = writeln!(output, "   - {issue}");
            }
        }
    }

    /// Formats a change type with color.
    fn format_change_type(change_type: ChangeType) -> String {
        match change_type {
            ChangeType::Added => "+added".green().to_string(),
            ChangeType::Modified => "~modified".yellow().to_string(),
            ChangeType::Removed => "-removed".red().to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }

    /// Pretty JSON.
    fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_default()
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        self.message("success", &"✓".green().to_string(), message)
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        self.message("error", &"✗".red().to_string(), message)
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str) -> String {
        self.message("warning", &"⚠".yellow().to_string(), message)
    }

    fn message(&self, status: &str, marker: &str, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                Self::json(&serde_json::json!({ "status": status, "message": message }))
            }
            OutputFormat::Text => format!("{marker} {message}"),
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct ValidationJson<'a> {
    is_valid: bool,
    error_count: usize,
    warning_count: usize,
    errors: &'a [crate::config::ValidationError],
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<&'a [String]>,
}

impl<'a> ValidationJson<'a> {
    fn new(result: &'a ValidationResult, show_warnings: bool) -> Self {
        Self {
            is_valid: result.is_valid(),
            error_count: result.error_count(),
            warning_count: result.warning_count(),
            errors: &result.errors,
            warnings: show_warnings.then_some(result.warnings.as_slice()),
        }
    }
}
