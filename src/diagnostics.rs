//! One-time diagnostics.
//!
//! A filter run may see the same missing file or missing tool for every image
//! in a document. [`Diagnostics`] remembers what has been reported and logs
//! each cause once.

use crate::log;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// What a warning is about. Equal keys are reported once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WarnKey {
    /// An image file that could not be read.
    MissingFile(PathBuf),
    /// An output format without inline SVG support.
    OutputFormat(String),
    /// An external tool that is missing, too old or failing.
    Tool(String),
    /// An image whose markup could not be parsed.
    InvalidSvg(PathBuf),
    /// A per-image attribute value that was ignored.
    Attribute(String),
}

/// Warning memo shared by every image of one filter run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reported: Mutex<FxHashSet<WarnKey>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `message` unless `key` was reported before.
    ///
    /// Returns `true` if the message was logged.
    pub fn warn_once(&self, key: WarnKey, message: impl Display) -> bool {
        if !self.reported.lock().insert(key) {
            return false;
        }
        log!("warning"; "{message}");
        true
    }

    pub fn missing_file(&self, path: &Path) -> bool {
        self.warn_once(
            WarnKey::MissingFile(path.to_path_buf()),
            format_args!("image not found: {}", path.display()),
        )
    }

    pub fn output_format(&self, format: &str) -> bool {
        self.warn_once(
            WarnKey::OutputFormat(format.to_string()),
            format_args!("output format `{format}` is not supported, images are left as they are"),
        )
    }

    pub fn tool(&self, tool: &str, problem: impl Display) -> bool {
        self.warn_once(WarnKey::Tool(tool.to_string()), problem)
    }

    /// Whether `key` has already been reported.
    pub fn was_reported(&self, key: &WarnKey) -> bool {
        self.reported.lock().contains(key)
    }

    /// Number of distinct warnings logged so far.
    pub fn count(&self) -> usize {
        self.reported.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================
