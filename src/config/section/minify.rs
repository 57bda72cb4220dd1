//! `[minify]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [minify]
//! enable = true
//! command = ["npx", "svgo"]      # default: ["svgo"]
//! indent = 2
//! pretty = true
//! preserve_prefixes = ["marker", "arrow", "Arrow"]
//! ```

use crate::svg::MinifyOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifySection {
    /// Run the external minifier before the tree clean-ups.
    pub enable: bool,

    /// Minifier command line (program first).
    pub command: Vec<String>,

    /// Indentation of the pretty-printed output.
    pub indent: u32,

    /// Pretty-print the output (one element per line).
    pub pretty: bool,

    /// Id prefixes the minifier must not touch. Marker ids are referenced
    /// from `marker-start`/`marker-end` properties it does not always track.
    pub preserve_prefixes: Vec<String>,
}

impl Default for MinifySection {
    fn default() -> Self {
        Self {
            enable: true,
            command: vec!["svgo".to_string()],
            indent: 2,
            pretty: true,
            preserve_prefixes: ["marker", "arrow", "Arrow"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl MinifySection {
    pub fn options(&self) -> MinifyOptions {
        MinifyOptions {
            indent: self.indent,
            pretty: self.pretty,
        }
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.enable && self.command.is_empty() {
            errors.push("minify.enable is true but minify.command is empty".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let section = MinifySection::default();
        assert!(section.enable);
        assert_eq!(section.command, ["svgo"]);
        assert_eq!(section.options(), MinifyOptions::default());
        assert_eq!(section.preserve_prefixes, ["marker", "arrow", "Arrow"]);
    }

    #[test]
    fn test_validate_empty_command() {
        let mut errors = Vec::new();
        let section = MinifySection {
            command: vec![],
            ..Default::default()
        };
        section.validate(&mut errors);
        assert_eq!(errors.len(), 1);

        // Disabled minifier needs no command
        errors.clear();
        MinifySection {
            enable: false,
            ..section
        }
        .validate(&mut errors);
        assert!(errors.is_empty());
    }
}
