//! Configuration: where period files live and how they are named

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default filename prefix of a period table
pub const DEFAULT_PREFIX: &str = "controle-";

/// Default table extension (Parquet backend)
pub const DEFAULT_EXTENSION: &str = "parquet";

/// Control-period file layout.
///
/// Loaded from JSON; missing keys take their defaults:
///
/// ```json
/// { "base_dir": "/var/lib/seigla", "file_prefix": "controle-", "extension": "parquet" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    base_dir: PathBuf,
    file_prefix: String,
    extension: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            file_prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl ControlConfig {
    /// Create a config builder rooted at `base_dir`
    #[must_use]
    pub fn builder(base_dir: impl Into<PathBuf>) -> ControlConfigBuilder {
        ControlConfigBuilder {
            config: Self {
                base_dir: base_dir.into(),
                ..Self::default()
            },
        }
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or invalid values
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or is invalid
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "cannot read configuration {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Directory holding the period files
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Filename prefix
    #[must_use]
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Filename extension, without the dot
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            return Err(Error::Config("file_prefix must not be empty".to_string()));
        }
        if self.extension.is_empty() {
            return Err(Error::Config("extension must not be empty".to_string()));
        }
        if self.extension.starts_with('.') {
            return Err(Error::Config(format!(
                "extension {:?} must be given without a leading dot",
                self.extension
            )));
        }
        for (name, value) in [("file_prefix", &self.file_prefix), ("extension", &self.extension)] {
            if value.contains(|c: char| c == '/' || c == '\\') {
                return Err(Error::Config(format!(
                    "{name} {value:?} must not contain path separators"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`ControlConfig`]
#[derive(Debug)]
pub struct ControlConfigBuilder {
    config: ControlConfig,
}

impl ControlConfigBuilder {
    /// Set the filename prefix
    #[must_use]
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    /// Set the table extension (without the dot)
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if prefix or extension is empty or contains a path separator
    pub fn build(self) -> Result<ControlConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
