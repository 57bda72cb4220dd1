//! External tool discovery and version checks.
//!
//! ```ignore
//! let version = tools::probe(&["npx", "svgo"], tools::SVGO_MIN_VERSION)?;
//! ```

use crate::utils::exec::{Cmd, SILENT_FILTER};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Oldest supported `svgo` release (ESM config files, `preset-default`).
pub const SVGO_MIN_VERSION: Version = Version::new(3, 0, 0);

/// Package runners resolve the real tool at run time.
const PACKAGE_RUNNERS: &[&str] = &["npx", "bunx", "pnpx", "yarn", "dlx"];

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\.([0-9]+)(?:\.([0-9]+))?").unwrap());

/// A `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find the first version number in `text` (e.g. `svgo 3.2.0\n`).
    pub fn find(text: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(text)?;
        let part = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok());
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Why a tool cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("no command configured")]
    Empty,

    #[error("`{0}` not found, install it or update [minify] command")]
    Missing(String),

    #[error("`{tool}` did not report a version")]
    UnknownVersion { tool: String },

    #[error("`{tool}` {found} is too old, {minimum} or newer is required")]
    TooOld {
        tool: String,
        found: Version,
        minimum: Version,
    },
}

/// Human-readable name of a command line (`npx svgo`).
pub fn display_name(command: &[String]) -> String {
    command.join(" ")
}

/// Check that `command` is installed and at least `minimum`.
pub fn probe(command: &[String], minimum: Version) -> Result<Version, ToolError> {
    let program = command.first().ok_or(ToolError::Empty)?;
    let name = display_name(command);

    if which::which(program).is_err() {
        return Err(ToolError::Missing(program.clone()));
    }

    let output = Cmd::from_slice(command)
        .arg("--version")
        .filter(&SILENT_FILTER)
        .run();

    // Package runners can fail here when the package is absent
    let stdout = match output {
        Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
        Err(_) if PACKAGE_RUNNERS.contains(&program.as_str()) => {
            return Err(ToolError::Missing(name));
        }
        Err(_) => String::new(),
    };

    let found = Version::find(&stdout).ok_or(ToolError::UnknownVersion { tool: name.clone() })?;
    check_version(&name, found, minimum)
}

fn check_version(tool: &str, found: Version, minimum: Version) -> Result<Version, ToolError> {
    if found < minimum {
        return Err(ToolError::TooOld {
            tool: tool.to_string(),
            found,
            minimum,
        });
    }
    Ok(found)
}

// ============================================================================
// Tests
// ============================================================================
