//! CLI module for the harness listing tool.
//!
//! This module provides the command-line interface for validating
//! configurations and managing listings.

mod commands;
mod output;

pub use commands::{Cli, Commands, DEFAULT_PAGE_SIZE, OutputFormat};
pub use output::OutputFormatter;
