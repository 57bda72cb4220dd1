//! Filter configuration: `svgweave.toml` plus document metadata.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── filter     # [filter]
//! │   ├── minify     # [minify]
//! │   └── text       # [text]
//! ├── types/         # ConfigError
//! ├── util.rs        # Config file lookup, JSON merge
//! └── mod.rs         # FilterConfig (this file)
//! ```
//!
//! # Sources
//!
//! Later sources override earlier ones, key by key:
//!
//! 1. Built-in defaults
//! 2. `svgweave.toml`, found by walking up from the working directory
//!    (or the `--config` path)
//! 3. The `svgweave` key of the document metadata
//!
//! ```yaml
//! ---
//! svgweave:
//!   minify:
//!     command: [npx, svgo]
//! ---
//! ```

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, merge_json};

pub use section::{FilterSection, MinifySection, TextSection};
pub use types::ConfigError;

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "svgweave.toml";

/// Document metadata key holding per-document overrides.
pub const METADATA_KEY: &str = "svgweave";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing svgweave.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Absolute path to the config file, if one was loaded (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Output formats and image lookup
    pub filter: FilterSection,

    /// External minifier
    pub minify: MinifySection,

    /// Text conversion
    pub text: TextSection,
}

impl FilterConfig {
    /// Load configuration for a filter run.
    ///
    /// An explicit `--config` path must exist; otherwise a missing file just
    /// means defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = match &cli.config {
            Some(path) => Some(
                fs::canonicalize(path)
                    .map_err(|err| ConfigError::Io(path.clone(), err))?,
            ),
            None => find_config_file(Path::new(CONFIG_FILE)),
        };

        let config = match path {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        if let Some(root) = path.parent() {
            config.filter.normalize_paths(root);
        }
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Overlay the document's `svgweave` metadata (already converted to JSON).
    ///
    /// Unknown keys are reported and ignored, like in the config file.
    pub fn with_metadata(&self, metadata: Value) -> Result<Self> {
        let mut merged = serde_json::to_value(self).map_err(ConfigError::from)?;
        merge_json(&mut merged, metadata);

        let mut ignored = Vec::new();
        let mut config: Self = serde_ignored::deserialize(merged, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, Path::new(METADATA_KEY));
        }

        config.config_path = self.config_path.clone();
        config.validate()?;
        Ok(config)
    }

    /// Print warning about unknown fields.
    ///
    /// Never prompts: stdin carries the document.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.filter.validate(&mut errors);
        self.minify.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(FilterConfig::from_str("[minify\nenable = true").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfig::from_str("").unwrap();
        assert_eq!(config, FilterConfig::default());
        assert!(config.minify.enable);
        assert!(config.text.enable);
        assert_eq!(config.filter.formats, ["html"]);
    }

    #[test]
    fn test_sections_parse() {
        let config = FilterConfig::from_str(
            "[minify]\ncommand = [\"npx\", \"svgo\"]\nindent = 4\n[text]\nenable = false",
        )
        .unwrap();
        assert_eq!(config.minify.command, ["npx", "svgo"]);
        assert_eq!(config.minify.indent, 4);
        assert!(config.minify.pretty);
        assert!(!config.text.enable);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (config, ignored) =
            FilterConfig::parse_with_ignored("[minify]\nenable = false\n[unknown]\nfield = 1")
                .unwrap();
        assert!(!config.minify.enable);
        assert!(ignored.iter().any(|f| f.contains("unknown")));
    }

    #[test]
    fn test_from_path_normalizes_resource_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[filter]\nresource_path = [\"figures\"]").unwrap();

        let config = FilterConfig::from_path(&path).unwrap();
        assert_eq!(config.filter.resource_path, [dir.path().join("figures")]);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_metadata_overlay() {
        let base = FilterConfig::from_str("[minify]\nindent = 4").unwrap();
        let config = base
            .with_metadata(json!({"minify": {"enable": false}, "text": {"enable": false}}))
            .unwrap();
        assert!(!config.minify.enable);
        assert_eq!(config.minify.indent, 4);
        assert!(!config.text.enable);
    }

    #[test]
    fn test_metadata_invalid_type() {
        let err = FilterConfig::default()
            .with_metadata(json!({"minify": {"indent": "wide"}}))
            .unwrap_err();
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = FilterConfig::from_str("[filter]\nformats = []\n[minify]\ncommand = []").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("filter.formats"));
        assert!(err.contains("minify.command"));
    }
}
