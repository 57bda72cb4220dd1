//! svgweave - a pandoc filter that inlines SVG figures into HTML.

mod cli;
mod config;
mod diagnostics;
mod filter;
mod logger;
mod svg;
mod tools;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::FilterConfig;
use filter::Filter;
use serde_json::Value;
use std::io::{self, BufWriter, Read, Write};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = FilterConfig::load(&cli)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read the document from stdin")?;
    let mut document: Value =
        serde_json::from_str(&input).context("Failed to parse the pandoc JSON document")?;

    let config = filter::configure(&config, &document);
    let filter = Filter::new(config, cli.format);
    let replaced = filter.run(&mut document);
    debug!("filter"; "replaced {replaced} images");

    let mut out = BufWriter::new(io::stdout().lock());
    serde_json::to_writer(&mut out, &document).context("Failed to write the document")?;
    out.flush().context("Failed to write the document")?;
    Ok(())
}
