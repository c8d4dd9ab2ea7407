//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default page size for `list`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// harness-listings - Validated, diff-gated wire harness listings.
#[derive(Parser, Debug)]
#[command(name = "harness-listings")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the product configuration file.
    #[arg(short, long, global = true, env = "HARNESS_LISTING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter product configuration.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the product configuration.
    Validate {
        /// Show warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Create the listing from the configuration.
    Create {
        /// Build the request without uploading or submitting anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Patch the published listing where it differs from the configuration.
    Update {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Show the patches without submitting them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how the published listing differs from the configuration.
    Diff,

    /// Show a published listing.
    Get {
        /// Seller SKU.
        sku: String,
    },

    /// Delete a published listing.
    Delete {
        /// Seller SKU.
        sku: String,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// List the seller's listings.
    List {
        /// Number of listings to show.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::try_parse_from([
            "harness-listings",
            "--config",
            "product.yaml",
            "--output",
            "json",
            "update",
            "--yes",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("product.yaml")));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Update {
                yes: true,
                dry_run: true
            }
        ));
    }

    #[test]
    fn test_list_default_page_size() {
        let cli = Cli::try_parse_from(["harness-listings", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                page_size: DEFAULT_PAGE_SIZE
            }
        ));
    }

    #[test]
    fn test_get_requires_sku() {
        assert!(Cli::try_parse_from(["harness-listings", "get"]).is_err());
    }
}
