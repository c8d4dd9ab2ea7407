//! Configuration module for the harness listing tool.
//!
//! This module handles all configuration-related functionality:
//! - Loading `product.yaml` (or JSON) into a generic document
//! - Validating documents against structural and business rules
//! - The typed product view used for payloads and change detection
//! - Credentials and settings from the environment

pub mod catalog;
mod parser;
mod settings;
mod spec;
mod validator;

pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use settings::{
    DEFAULT_LWA_ENDPOINT, DEFAULT_MARKETPLACE_ID, DEFAULT_SP_API_ENDPOINT, MarketplaceSettings,
    MediaSettings,
};
pub use spec::{AmazonMetadata, Pricing, ProductConfig, ProductInfo, Specifications};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
