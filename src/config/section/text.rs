//! `[text]` section configuration.
//!
//! ```toml
//! [text]
//! enable = true   # replace <text> with live HTML blocks
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSection {
    /// Convert `<text>` elements to `<foreignObject>` blocks.
    pub enable: bool,
}

impl Default for TextSection {
    fn default() -> Self {
        Self { enable: true }
    }
}
