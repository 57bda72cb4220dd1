//! pandoc JSON filter boundary.
//!
//! # Module Structure
//!
//! ```text
//! filter/
//! ├── ast.rs     # Modeled pandoc elements, stringify
//! ├── attrs.rs   # Image attribute split and projection
//! ├── image.rs   # One image to inline <svg>
//! └── mod.rs     # Filter context, metadata, document walk (this file)
//! ```
//!
//! # Replacements
//!
//! | Input                                         | Output                        |
//! |-----------------------------------------------|-------------------------------|
//! | `Image`                                       | `RawInline html <svg>`        |
//! | `Para [Image]` with title `fig:..`            | `RawBlock html <figure>`      |
//! | `Figure` whose body is `Plain/Para [Image]`   | `RawBlock html <figure>`      |
//!
//! Anything the filter cannot handle is left as pandoc produced it.

pub mod ast;
pub mod attrs;
pub mod image;

use crate::config::{FilterConfig, METADATA_KEY};
use crate::diagnostics::Diagnostics;
use crate::svg::Minifier;
use crate::svg::optimize::Svgo;
use crate::tools;
use crate::utils::html::{escape, escape_attr};
use crate::{debug, log};
use ast::{Attr, Element, FIGURE_TITLE_PREFIX, Target, stringify};
use image::{Placement, SkipReason};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Output format assumed when pandoc passes none.
pub const DEFAULT_FORMAT: &str = "html";

/// State of one filter run.
pub struct Filter {
    config: FilterConfig,
    format: String,
    diag: Diagnostics,
    /// Probed on first use; `None` when disabled or unavailable.
    minifier: OnceLock<Option<Box<dyn Minifier>>>,
}

impl Filter {
    pub fn new(config: FilterConfig, format: Option<String>) -> Self {
        Self {
            config,
            format: format.unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            diag: Diagnostics::new(),
            minifier: OnceLock::new(),
        }
    }

    /// Use `minifier` instead of probing for the configured command.
    pub fn with_minifier(self, minifier: Box<dyn Minifier>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Some(minifier));
        Self {
            minifier: cell,
            ..self
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    fn format_supported(&self) -> bool {
        self.config.filter.supports(&self.format)
    }

    fn minifier(&self) -> Option<&dyn Minifier> {
        self.minifier
            .get_or_init(|| {
                if !self.config.minify.enable {
                    return None;
                }
                match Svgo::new(&self.config.minify) {
                    Ok(svgo) => Some(Box::new(svgo) as Box<dyn Minifier>),
                    Err(err) => {
                        let name = tools::display_name(&self.config.minify.command);
                        self.diag.tool(
                            &name,
                            format_args!("{err:#}, images are not minified"),
                        );
                        None
                    }
                }
            })
            .as_deref()
    }

    /// Rewrite the image references of a whole pandoc document in place.
    ///
    /// Returns the number of replaced elements.
    pub fn run(&self, document: &mut Value) -> usize {
        let mut replaced = 0;
        if let Some(blocks) = document.get_mut("blocks") {
            self.walk(blocks, &mut replaced);
        }
        replaced
    }

    fn walk(&self, value: &mut Value, replaced: &mut usize) {
        match self.visit(value) {
            Visit::Replace(replacement) => {
                *value = replacement;
                *replaced += 1;
                return;
            }
            Visit::Keep => return,
            Visit::Descend => {}
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, replaced);
                }
            }
            Value::Object(map) => {
                if let Some(content) = map.get_mut("c") {
                    self.walk(content, replaced);
                }
            }
            _ => {}
        }
    }

    /// What to do with `value`: images and figures of one image are
    /// replaced or kept, everything else is searched further.
    fn visit(&self, value: &Value) -> Visit {
        let Some(element) = Element::from_value(value) else {
            return Visit::Descend;
        };
        match element {
            Element::Image(attr, alt, target) => self.inline_image(attr, alt, target),
            Element::Para(inlines) => {
                let Some((attr, alt, target)) = single_image(inlines) else {
                    return Visit::Descend;
                };
                if !target.1.starts_with(FIGURE_TITLE_PREFIX) {
                    return Visit::Descend;
                }
                let caption = stringify(&alt);
                let id = attr.id().to_string();
                let url = target.0.clone();
                let rebuild = move |attr, alt| {
                    Element::Para(vec![Element::Image(attr, alt, target).to_value()])
                };
                self.figure(attr, alt, &url, &id, &caption, rebuild)
            }
            Element::Figure(figure_attr, caption, body) => {
                let Some((plain, inlines)) = single_block(body) else {
                    return Visit::Descend;
                };
                let Some((attr, alt, target)) = single_image(inlines) else {
                    return Visit::Descend;
                };
                let text = stringify(&caption.1);
                let id = match figure_attr.id() {
                    "" => attr.id().to_string(),
                    id => id.to_string(),
                };
                let url = target.0.clone();
                let rebuild = move |attr, alt| {
                    let image = vec![Element::Image(attr, alt, target).to_value()];
                    let inner = if plain {
                        Element::Plain(image)
                    } else {
                        Element::Para(image)
                    };
                    Element::Figure(figure_attr, caption, vec![inner.to_value()])
                };
                self.figure(attr, alt, &url, &id, &text, rebuild)
            }
            Element::Plain(_) => Visit::Descend,
            Element::RawInline(..) | Element::RawBlock(..) => Visit::Keep,
        }
    }

    fn inline_image(&self, mut attr: Attr, alt: Vec<Value>, target: Target) -> Visit {
        match self.render_image(&mut attr, &target.0, Placement::Inline) {
            Ok(svg) => Visit::Replace(Element::raw_inline(svg).to_value()),
            Err(SkipReason::Ignored) => Visit::Replace(Element::Image(attr, alt, target).to_value()),
            Err(reason) => {
                debug!("image"; "skipped {}: {reason}", target.0);
                Visit::Keep
            }
        }
    }

    /// `<figure>` block for an image, or the original element rebuilt by
    /// `rebuild` when the image was marked `ignore`.
    fn figure(
        &self,
        mut attr: Attr,
        alt: Vec<Value>,
        url: &str,
        id: &str,
        caption: &str,
        rebuild: impl FnOnce(Attr, Vec<Value>) -> Element,
    ) -> Visit {
        match self.render_image(&mut attr, url, Placement::Figure) {
            Ok(svg) => Visit::Replace(Element::raw_block(figure_html(id, &svg, caption)).to_value()),
            Err(SkipReason::Ignored) => Visit::Replace(rebuild(attr, alt).to_value()),
            Err(reason) => {
                debug!("image"; "skipped figure {url}: {reason}");
                Visit::Keep
            }
        }
    }
}

/// Outcome of looking at one AST node.
#[derive(Debug)]
enum Visit {
    Replace(Value),
    /// Handled or left to pandoc; children are not searched.
    Keep,
    Descend,
}

/// Inlines of a figure body made of one `Para` or `Plain`, and whether it
/// was a `Plain`.
fn single_block(body: Vec<Value>) -> Option<(bool, Vec<Value>)> {
    let [block] = <[Value; 1]>::try_from(body).ok()?;
    match Element::from_value(&block)? {
        Element::Para(inlines) => Some((false, inlines)),
        Element::Plain(inlines) => Some((true, inlines)),
        _ => None,
    }
}

/// The image of a one-image paragraph.
fn single_image(inlines: Vec<Value>) -> Option<(Attr, Vec<Value>, Target)> {
    let [inline] = <[Value; 1]>::try_from(inlines).ok()?;
    match Element::from_value(&inline)? {
        Element::Image(attr, alt, target) => Some((attr, alt, target)),
        _ => None,
    }
}

fn figure_html(id: &str, svg: &str, caption: &str) -> String {
    let mut html = String::from("<figure");
    if !id.is_empty() {
        html.push_str(&format!(r#" id="{}""#, escape_attr(id)));
    }
    html.push_str(">\n");
    html.push_str(svg);
    html.push('\n');
    if !caption.is_empty() {
        html.push_str(&format!("<figcaption>{}</figcaption>\n", escape(caption)));
    }
    html.push_str("</figure>");
    html
}

// ============================================================================
// metadata
// ============================================================================

/// Apply the document's `svgweave` metadata on top of `config`.
///
/// Invalid metadata is reported and the file configuration is kept.
pub fn configure(config: &FilterConfig, document: &Value) -> FilterConfig {
    let Some(meta) = document.get("meta").and_then(|m| m.get(METADATA_KEY)) else {
        return config.clone();
    };
    match config.with_metadata(meta_to_json(meta)) {
        Ok(merged) => merged,
        Err(err) => {
            log!("warning"; "ignoring `{METADATA_KEY}` metadata: {err:#}");
            config.clone()
        }
    }
}

/// Plain JSON for a pandoc `MetaValue`.
///
/// Scalars written in YAML arrive as inlines; those that read as numbers or
/// booleans are typed accordingly.
pub fn meta_to_json(meta: &Value) -> Value {
    let tag = meta.get("t").and_then(Value::as_str).unwrap_or_default();
    let content = meta.get("c").unwrap_or(&Value::Null);
    match tag {
        "MetaMap" => {
            let map: Map<String, Value> = content
                .as_object()
                .map(|entries| {
                    entries
                        .iter()
                        .map(|(key, value)| (key.clone(), meta_to_json(value)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(map)
        }
        "MetaList" => Value::Array(
            content
                .as_array()
                .map(|items| items.iter().map(meta_to_json).collect())
                .unwrap_or_default(),
        ),
        "MetaBool" => content.clone(),
        "MetaString" => scalar(content.as_str().unwrap_or_default()),
        "MetaInlines" | "MetaBlocks" => {
            scalar(&stringify(content.as_array().map(Vec::as_slice).unwrap_or_default()))
        }
        _ => Value::Null,
    }
}

fn scalar(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
