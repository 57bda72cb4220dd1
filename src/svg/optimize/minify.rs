//! Structural minification through an external minifier.
//!
//! The production minifier is the `svgo` CLI. Markup goes in on stdin and the
//! result comes back on stdout; plugin settings live in a generated ES module
//! config because the CLI has no flags for them.

use crate::config::MinifySection;
use crate::tools::{self, SVGO_MIN_VERSION};
use crate::utils::exec::{Cmd, FilterRule};
use anyhow::{Context, Result, bail};
use std::io::Write;
use tempfile::NamedTempFile;

/// Output formatting requested from the minifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    pub indent: u32,
    pub pretty: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            pretty: true,
        }
    }
}

/// Markup in, smaller equivalent markup out.
pub trait Minifier: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn minify(&self, markup: &str, options: &MinifyOptions) -> Result<String>;
}

/// svgo prints a banner line on stderr for some inputs.
const SVGO_FILTER: FilterRule = FilterRule::new(&["Done in", "svgo:"]);

// ============================================================================
// svgo
// ============================================================================

/// [`Minifier`] backed by the `svgo` command line tool.
#[derive(Debug)]
pub struct Svgo {
    command: Vec<String>,
    /// Generated `svgo.config.mjs`, removed on drop.
    config_file: NamedTempFile,
}

impl Svgo {
    /// Check the configured command and write its config file.
    pub fn new(section: &MinifySection) -> Result<Self> {
        tools::probe(&section.command, SVGO_MIN_VERSION)?;
        let config_file = write_config(&section.preserve_prefixes)?;
        Ok(Self {
            command: section.command.clone(),
            config_file,
        })
    }
}

impl Minifier for Svgo {
    fn name(&self) -> &str {
        self.command.first().map_or("svgo", String::as_str)
    }

    fn minify(&self, markup: &str, options: &MinifyOptions) -> Result<String> {
        let indent = options.indent.to_string();
        let mut cmd = Cmd::from_slice(&self.command)
            .args(["--input", "-", "--output", "-"])
            .arg("--config")
            .arg(self.config_file.path())
            .args(["--indent", indent.as_str()]);
        if options.pretty {
            cmd = cmd.arg("--pretty");
        }

        let output = cmd.stdin(markup).filter(&SVGO_FILTER).run()?;
        let minified = String::from_utf8(output.stdout).context("svgo produced invalid UTF-8")?;
        if minified.trim().is_empty() {
            bail!("svgo produced no output");
        }
        Ok(minified)
    }
}

/// Config module content: `preset-default` with id cleanup that keeps
/// marker ids readable and never shortens them.
fn config_source(preserve_prefixes: &[String]) -> String {
    let prefixes = serde_json::to_string(preserve_prefixes).unwrap_or_else(|_| "[]".into());
    format!(
        r#"export default {{
  plugins: [
    {{
      name: "preset-default",
      params: {{
        overrides: {{
          cleanupIds: {{ preservePrefixes: {prefixes}, minify: false }},
        }},
      }},
    }},
  ],
}};
"#
    )
}

fn write_config(preserve_prefixes: &[String]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("svgweave-svgo-")
        .suffix(".mjs")
        .tempfile()
        .context("Failed to create svgo config file")?;
    file.write_all(config_source(preserve_prefixes).as_bytes())
        .context("Failed to write svgo config file")?;
    file.flush()?;
    Ok(file)
}

// ============================================================================
// Tests
// ============================================================================
