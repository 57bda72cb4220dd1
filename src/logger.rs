//! Logging utilities with colored output.
//!
//! stdout carries the filtered document, so everything here goes to stderr.
//!
//! This module provides:
//! - `log!` macro for formatted messages with colored prefixes
//! - `debug!` macro for messages shown only with `--verbose`
//!
//! # Example
//!
//! ```ignore
//! log!("svgo"; "minified {} bytes", len);
//! debug!("image"; "resized {} to {}x{}", path, w, h);
//! ```

use owo_colors::{AnsiColors, OwoColorize, Stream};
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    let color = match module_lower {
        "error" => AnsiColors::BrightRed,
        "warning" => AnsiColors::BrightYellow,
        "svg" | "image" => AnsiColors::BrightBlue,
        _ => AnsiColors::BrightGreen,
    };
    // Honors `--color` and whether stderr is a terminal
    prefix
        .if_supports_color(Stream::Stderr, |text| text.color(color).bold().to_string())
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_plain_without_color() {
        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("svgo", "svgo"), "[svgo]");
        assert_eq!(colorize_prefix("Warning", "warning"), "[Warning]");
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
