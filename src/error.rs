//! Error types for the harness listing tool.
//!
//! This module provides the error hierarchy for every operation outside the
//! validation and change-detection core: configuration loading, marketplace
//! API calls, and image hosting. Validation problems inside a document are
//! never raised as errors; they are reported through `ValidationResult`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the harness listing tool.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Marketplace API errors.
    #[error("Marketplace API error: {0}")]
    Marketplace(#[from] MarketplaceError),

    /// Image hosting errors.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The document failed validation.
    #[error("Configuration is invalid ({count} error(s)), first: {first}")]
    ValidationFailed {
        /// Number of validation errors.
        count: usize,
        /// Rendered first error.
        first: String,
    },

    /// A validated document could not be mapped to the typed view.
    #[error("Configuration document has an unexpected shape: {message}")]
    InvalidDocument {
        /// Description of the mapping failure.
        message: String,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Marketplace (Selling Partner API) errors.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Authentication failed.
    #[error("Marketplace authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Marketplace API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limited.
    #[error("Marketplace API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Listing not found.
    #[error("Listing not found: {sku}")]
    ListingNotFound {
        /// SKU of the missing listing.
        sku: String,
    },

    /// Network error.
    #[error("Network error communicating with the marketplace: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("Invalid response from marketplace API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// The marketplace accepted the request but rejected the submission.
    #[error("Listing submission rejected: {}", issues.join("; "))]
    SubmissionRejected {
        /// Rendered issues reported by the marketplace.
        issues: Vec<String>,
    },
}

/// Image hosting errors.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The image extension is not one the marketplace accepts.
    #[error("Unsupported image format: {path}")]
    UnsupportedFormat {
        /// Path of the rejected image.
        path: PathBuf,
    },

    /// Uploading an image failed.
    #[error("Failed to upload image {path}: {message}")]
    UploadFailed {
        /// Path of the image.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// No image bucket has been configured.
    #[error("Image hosting is not configured (set LISTING_IMAGE_BUCKET)")]
    NotConfigured,
}

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;

impl ListingError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Marketplace(
                MarketplaceError::RateLimited { .. } | MarketplaceError::NetworkError { .. }
            )
        )
    }

    /// Returns the delay the server asked for before retrying, in seconds.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Marketplace(MarketplaceError::RateLimited { retry_after_secs }) => {
                Some(*retry_after_secs)
            }
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a parse error for a document at an optional location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}

impl MarketplaceError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = ListingError::from(MarketplaceError::RateLimited {
            retry_after_secs: 7,
        });
        assert!(err.is_retryable());
        assert_eq!(err.retry_delay_secs(), Some(7));
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let err = ListingError::from(MarketplaceError::ListingNotFound {
            sku: String::from("AB-123"),
        });
        assert!(!err.is_retryable());
        assert_eq!(err.retry_delay_secs(), None);
    }

    #[test]
    fn test_network_error_has_no_server_delay() {
        let err = ListingError::from(MarketplaceError::network("connection reset"));
        assert!(err.is_retryable());
        assert_eq!(err.retry_delay_secs(), None);
    }

    #[test]
    fn test_submission_rejected_lists_issues() {
        let err = MarketplaceError::SubmissionRejected {
            issues: vec![String::from("a"), String::from("b")],
        };
        assert_eq!(err.to_string(), "Listing submission rejected: a; b");
    }
}
