//! `[filter]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [filter]
//! formats = ["html"]           # output formats that get inline SVG
//! resource_path = [".", "img"] # directories searched for relative image paths
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Output formats that receive inline SVG. Compared by base name, so
    /// `html` also covers `html5` and `html+smart`.
    pub formats: Vec<String>,

    /// Directories searched, in order, for relative image paths.
    pub resource_path: Vec<PathBuf>,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            formats: vec!["html".to_string()],
            resource_path: vec![PathBuf::from(".")],
        }
    }
}

impl FilterSection {
    /// Whether `format` (as passed by pandoc) gets inline SVG.
    pub fn supports(&self, format: &str) -> bool {
        let base = base_format(format);
        self.formats.iter().any(|f| base_format(f) == base)
    }

    /// Find an image file: `~` is expanded, absolute paths are used as-is,
    /// relative ones are tried against each resource directory.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
        if expanded.is_absolute() {
            return expanded.is_file().then_some(expanded);
        }
        self.resource_path
            .iter()
            .map(|dir| dir.join(&expanded))
            .find(|candidate| candidate.is_file())
    }

    /// Anchor relative resource directories at `root`.
    pub fn normalize_paths(&mut self, root: &Path) {
        for dir in &mut self.resource_path {
            let expanded = PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned());
            *dir = if expanded.is_absolute() {
                expanded
            } else {
                root.join(expanded)
            };
        }
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.formats.is_empty() {
            errors.push("filter.formats is empty, no output format would get inline SVG".into());
        }
        if self.resource_path.is_empty() {
            errors.push("filter.resource_path is empty, no image could be found".into());
        }
    }
}

/// `html5+smart` -> `html`.
fn base_format(format: &str) -> &str {
    let name = format
        .split(['+', '-'])
        .next()
        .unwrap_or(format);
    name.trim_end_matches(|c: char| c.is_ascii_digit())
}
