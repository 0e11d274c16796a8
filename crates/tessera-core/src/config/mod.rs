//! # Tessera Configuration
//!
//! Document loading and the configuration value types.
//!
//! - **[`ConfigFormat`]**: JSON always, YAML behind `yaml-config`, TOML behind
//!   `toml-config`, chosen by file extension.
//! - **[`load_document`]**: reads and deserializes any serde document.
//! - **[`Configuration`]**: the per-component configuration tree.
//! - **[`KernelConfig`]**: runtime-wide switches such as partial startup.
pub mod configuration;
pub mod kernel_config;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use configuration::Configuration;
pub use kernel_config::KernelConfig;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Errors raised while reading a document from disk.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format for '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse '{path}' as {format}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Required document '{0}' is missing")]
    Missing(PathBuf),
}

/// Deserialize `data` in the given format. `origin` is only used in errors.
pub fn parse_document<T: DeserializeOwned>(
    data: &str,
    format: ConfigFormat,
    origin: &Path,
) -> Result<T, DocumentError> {
    let parse_error = |message: String| DocumentError::Parse {
        path: origin.to_path_buf(),
        format: format.extension(),
        message,
    };

    match format {
        ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(e.to_string())),
        #[cfg(feature = "yaml-config")]
        ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_error(e.to_string())),
        #[cfg(feature = "toml-config")]
        ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read and deserialize the document at `path`, picking the format from its extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let format =
        ConfigFormat::from_path(path).ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;

    if !path.exists() {
        return Err(DocumentError::Missing(path.to_path_buf()));
    }

    let data = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&data, format, path)
}
