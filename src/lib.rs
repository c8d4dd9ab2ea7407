// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Harness Listings
//!
//! Validated, diff-gated management of wire harness listings on the Amazon
//! Selling Partner API.
//!
//! ## Overview
//!
//! A listing is described by a human-authored `product.yaml`. The tool:
//!
//! - Validates the document against structural and business rules, with
//!   hard errors and advisory warnings kept apart
//! - Uploads the product images to S3
//! - Maps the configuration to a Listings Items payload
//! - Compares the configuration with the published listing and patches only
//!   the attributes that differ
//!
//! ## Architecture
//!
//! Updates follow a **fetch, compare, patch** loop:
//!
//! 1. **Desired listing**: defined in `product.yaml`
//! 2. **Published listing**: read from the Listings Items API
//! 3. **Change detector**: normalizes both sides and reports field changes
//! 4. **Workflow**: turns the changes into patch operations and submits them
//!
//! ## Modules
//!
//! - [`config`]: Document loading, validation and settings
//! - [`listing`]: Change detection and payload building
//! - [`marketplace`]: Selling Partner API client
//! - [`media`]: Image hosting
//! - [`workflow`]: Create, update, fetch and delete operations
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! product:
//!   title: "4-Pin Molex Wire Harness, 18 AWG, 24 in"
//!   sku: WH-4PIN-18AWG
//!   description: "Pre-crimped four pin harness ..."
//!
//! specifications:
//!   pin_count: 4
//!   wire_gauge: "18 AWG"
//!   length: "24 inches"
//!   connector_type: "Molex Connector"
//!
//! pricing:
//!   price: 19.99
//!
//! images:
//!   - images/front.jpg
//!
//! amazon:
//!   category: electronics-components
//!   search_keywords: [wire harness, molex, 18 awg]
//!   bullet_points: [...]
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod marketplace;
pub mod media;
pub mod workflow;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, ProductConfig, ValidationResult};
pub use error::{ListingError, Result};
pub use listing::{ChangeDetector, FieldChange, ListingPayloadBuilder};
pub use marketplace::{ListingsApi, SpApiClient};
pub use media::{ImageUploader, S3ImageUploader};
pub use workflow::{CreateOutcome, ListingWorkflow, UpdateOutcome};
