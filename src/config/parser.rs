//! Configuration parser for loading product documents.
//!
//! Product files are loaded into a generic document so the validator can
//! report on any shape, well-formed or not. YAML and JSON are both accepted;
//! the format is picked from the file extension.

use crate::error::{ConfigError, ListingError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application directory name under the user's config directory.
const APP_DIR: &str = "harness-listings";

/// Configuration parser for loading product documents.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

/// Document formats understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Yaml,
    Json,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Returns the directory relative paths in a document resolve against.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.base_path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Loads a product document from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ListingError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            )
        })?;

        match DocumentFormat::for_path(path) {
            DocumentFormat::Json => Self::parse_json(&content, Some(path)),
            DocumentFormat::Yaml => Self::parse_yaml(&content, Some(path)),
        }
    }

    /// Parses a document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(content: &str, source: Option<&Path>) -> Result<Value> {
        debug!("Parsing YAML document");

        serde_yaml::from_str(content).map_err(|e| {
            ConfigError::parse(
                format!("YAML parse error: {e}"),
                source.map(|p| p.display().to_string()),
            )
            .into()
        })
    }

    /// Parses a document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(content: &str, source: Option<&Path>) -> Result<Value> {
        debug!("Parsing JSON document");

        serde_json::from_str(content).map_err(|e| {
            ConfigError::parse(
                format!("JSON parse error: {e}"),
                source.map(|p| p.display().to_string()),
            )
            .into()
        })
    }

    /// Loads the `.env` file next to the configuration, or the user-level one.
    ///
    /// Variables already present in the environment are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if a .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let local = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));
        let user = dirs::config_dir().map(|d| d.join(APP_DIR).join(".env"));

        for env_path in std::iter::once(local).chain(user) {
            if env_path.exists() {
                info!("Loading environment from: {}", env_path.display());
                dotenvy::from_path(&env_path).map_err(|e| {
                    ConfigError::parse(
                        format!("Failed to load .env file: {e}"),
                        Some(env_path.display().to_string()),
                    )
                })?;
            } else {
                debug!(".env file not found at: {}", env_path.display());
            }
        }

        Ok(())
    }
}

impl DocumentFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "product.yaml",
    "product.yml",
    "listing.yaml",
    "listing.json",
];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ListingError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
