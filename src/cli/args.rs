//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// pandoc filter that inlines SVG images as live, typeset HTML
///
/// Reads a pandoc JSON AST on stdin and writes the filtered AST to stdout:
///
///   pandoc doc.md --filter svgweave -o doc.html
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format (passed by pandoc, e.g. `html5`)
    #[arg(value_name = "FORMAT")]
    pub format: Option<String>,

    /// Config file path (default: svgweave.toml, searched upward)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
