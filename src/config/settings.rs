//! Runtime settings read from the environment.
//!
//! Credentials never live in the product file. They come from environment
//! variables, usually populated from a `.env` file by
//! [`ConfigParser::load_dotenv`](super::ConfigParser::load_dotenv).

use crate::error::{ConfigError, Result};

/// Default marketplace (amazon.com).
pub const DEFAULT_MARKETPLACE_ID: &str = "ATVPDKIKX0DER";

/// Default Selling Partner API endpoint (North America).
pub const DEFAULT_SP_API_ENDPOINT: &str = "https://sellingpartnerapi-na.amazon.com";

/// Default Login with Amazon token endpoint.
pub const DEFAULT_LWA_ENDPOINT: &str = "https://api.amazon.com/auth/o2/token";

/// Credentials and addressing for the Selling Partner API.
#[derive(Debug, Clone)]
pub struct MarketplaceSettings {
    /// LWA client identifier.
    pub client_id: String,
    /// LWA client secret.
    pub client_secret: String,
    /// LWA refresh token for the seller authorization.
    pub refresh_token: String,
    /// Merchant (seller) identifier.
    pub seller_id: String,
    /// Marketplace the listings live in.
    pub marketplace_id: String,
    /// Selling Partner API base URL.
    pub endpoint: String,
    /// LWA token URL.
    pub lwa_endpoint: String,
    /// Currency used for offers.
    pub currency: String,
}

/// Image hosting settings.
#[derive(Debug, Clone, Default)]
pub struct MediaSettings {
    /// S3 bucket images are uploaded to.
    pub bucket: Option<String>,
    /// Key prefix inside the bucket.
    pub prefix: Option<String>,
    /// Bucket region.
    pub region: Option<String>,
}

impl MarketplaceSettings {
    /// Reads settings from `SP_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            client_id: required("SP_API_CLIENT_ID")?,
            client_secret: required("SP_API_CLIENT_SECRET")?,
            refresh_token: required("SP_API_REFRESH_TOKEN")?,
            seller_id: required("SP_API_SELLER_ID")?,
            marketplace_id: lookup("SP_API_MARKETPLACE_ID")
                .unwrap_or_else(|| DEFAULT_MARKETPLACE_ID.to_string()),
            endpoint: lookup("SP_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_SP_API_ENDPOINT.to_string()),
            lwa_endpoint: lookup("SP_API_LWA_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_LWA_ENDPOINT.to_string()),
            currency: lookup("SP_API_CURRENCY").unwrap_or_else(|| String::from("USD")),
        })
    }
}

impl MediaSettings {
    /// Reads settings from `LISTING_IMAGE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("LISTING_IMAGE_BUCKET").ok(),
            prefix: std::env::var("LISTING_IMAGE_PREFIX").ok(),
            region: std::env::var("LISTING_IMAGE_REGION").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListingError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply() {
        let vars = env(&[
            ("SP_API_CLIENT_ID", "id"),
            ("SP_API_CLIENT_SECRET", "secret"),
            ("SP_API_REFRESH_TOKEN", "refresh"),
            ("SP_API_SELLER_ID", "SELLER"),
        ]);

        let settings = MarketplaceSettings::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(settings.marketplace_id, DEFAULT_MARKETPLACE_ID);
        assert_eq!(settings.endpoint, DEFAULT_SP_API_ENDPOINT);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_missing_required_variable() {
        let vars = env(&[("SP_API_CLIENT_ID", "id"), ("SP_API_CLIENT_SECRET", " ")]);

        let result = MarketplaceSettings::from_lookup(|k| vars.get(k).cloned());
        match result {
            Err(ListingError::Config(ConfigError::MissingEnvVar { name })) => {
                assert_eq!(name, "SP_API_CLIENT_SECRET");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
