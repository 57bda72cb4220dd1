//! `<text>` -> `<foreignObject>` conversion.
//!
//! Browser SVG text cannot wrap, typeset math or use document fonts. Each text
//! element is replaced by a foreign object holding HTML rendered from its
//! content (markdown with `$...$` math), positioned so the first line's
//! baseline sits where the SVG text baseline was.
//!
//! ```text
//! <text x="10" y="20" style="font-size:12px;text-anchor:middle">$x^2$</text>
//! <foreignObject x="10" y="20" width="1000" overflow="visible" height="1"
//!     style="font-size:12px;text-align:center">
//!   <p style="margin-top:-240px;transform:translateX(-50%)">
//!     <span style="display:inline-block;height:240px"></span>
//!     <span class="math inline">\(x^2\)</span>
//!   </p>
//! </foreignObject>
//! ```

pub mod markdown;

use super::dimension::{Dimension, format_number};
use super::dom::{Document, Element, NodeId, Style};

/// Font size assumed when the text does not set one.
const DEFAULT_FONT_SIZE: &str = "16px";

/// Baseline marker height in font sizes. Tall enough that the marker, not
/// the line's own content, decides the baseline of the first line.
const BASELINE_MARKER_SCALE: f64 = 20.0;

/// Width used when the text has no `inline-size` (it never wraps then).
const FALLBACK_WIDTH: &str = "1000";

/// Convert every `<text>` element. Returns the number of replaced elements.
pub fn convert_texts(doc: &mut Document) -> usize {
    let texts = doc.find_all(doc.root(), "text");
    texts
        .into_iter()
        .filter(|text| convert_text(doc, *text))
        .count()
}

/// Returns `true` if the text was replaced by a foreign object.
fn convert_text(doc: &mut Document, text: NodeId) -> bool {
    flatten_runs(doc, text);

    let content = doc.text_content(text);
    if content.trim().is_empty() {
        doc.detach(text);
        return false;
    }

    let Some(source) = doc.element(text).cloned() else {
        return false;
    };

    let nodes = match single_formula(&content) {
        Some(formula) => {
            let p = doc.create_element(Element::new("p"));
            let math = markdown::inline_math(doc, formula);
            doc.append(p, math);
            vec![p]
        }
        None => markdown::render(doc, content.trim()),
    };

    let font_size = source
        .style_or_attr("font-size")
        .unwrap_or_else(|| DEFAULT_FONT_SIZE.to_string());
    let anchor = Anchor::from_value(source.style_or_attr("text-anchor").as_deref());

    let block = doc.create_element(block_element(&source, &font_size, anchor));
    for node in &nodes {
        doc.append(block, *node);
    }

    let first = nodes.iter().copied().find(|n| doc.element(*n).is_some());
    if let Some(first) = first {
        insert_baseline_marker(doc, first, &font_size);
    }
    if let Some(shift) = anchor.shift() {
        for node in nodes {
            if let Some(elem) = doc.element_mut(node) {
                let mut style = elem.style();
                style.set("transform", shift);
                elem.set_style(&style);
            }
        }
    }

    doc.replace(text, block);
    true
}

/// Merge `<tspan>` content into the text, keeping the first run font size
/// when the text itself has none.
fn flatten_runs(doc: &mut Document, text: NodeId) {
    for run in doc.find_all(text, "tspan") {
        let run_size = doc.element(run).and_then(|e| e.style_or_attr("font-size"));
        if let Some(size) = run_size
            && let Some(elem) = doc.element_mut(text)
            && elem.style_or_attr("font-size").is_none()
        {
            let mut style = elem.style();
            style.set("font-size", size);
            elem.set_style(&style);
        }
        doc.unwrap(run);
    }
}

/// `$formula$` with no other `$` inside.
fn single_formula(content: &str) -> Option<&str> {
    let inner = content.trim().strip_prefix('$')?.strip_suffix('$')?;
    (!inner.is_empty() && !inner.contains('$')).then_some(inner)
}

fn block_element(source: &Element, font_size: &str, anchor: Anchor) -> Element {
    let mut block = Element::new("foreignObject");
    for key in ["x", "y"] {
        if let Some(value) = source.attr(key) {
            block.set_attr(key, value);
        }
    }

    match source.style_or_attr("inline-size") {
        Some(width) => block.set_attr("width", width),
        None => {
            block.set_attr("width", FALLBACK_WIDTH);
            block.set_attr("overflow", "visible");
        }
    }
    block.set_attr("height", "1");

    if let Some(transform) = source.attr("transform") {
        block.set_attr("transform", transform);
    }

    let mut style = Style::new();
    style.set("font-size", font_size);
    if let Some(family) = source.style_or_attr("font-family") {
        style.set("font-family", family);
    }
    if let Some(fill) = source.style_or_attr("fill") {
        style.set("color", fill);
    }
    if let Some(opacity) = source.style_or_attr("opacity") {
        style.set("opacity", opacity);
    }
    if let Some(align) = anchor.text_align() {
        style.set("text-align", align);
    }
    block.set_style(&style);
    block
}

/// Prepend an inline-block of `20 x font-size` to `first` and pull `first`
/// up by the same amount.
fn insert_baseline_marker(doc: &mut Document, first: NodeId, font_size: &str) {
    let height = baseline_marker_height(font_size);

    let mut marker = Element::new("span");
    let mut style = Style::new();
    style.set("display", "inline-block");
    style.set("height", height.as_str());
    marker.set_style(&style);
    let marker = doc.create_element(marker);
    doc.insert(first, 0, marker);

    if let Some(elem) = doc.element_mut(first) {
        let mut style = elem.style();
        style.set("margin-top", format!("-{height}"));
        elem.set_style(&style);
    }
}

fn baseline_marker_height(font_size: &str) -> String {
    let size = Dimension::parse(font_size.trim()).or_else(|| Dimension::parse(DEFAULT_FONT_SIZE));
    match size.map(|d| d.scaled(BASELINE_MARKER_SCALE)) {
        Some(d) if d.unit.suffix().is_empty() => format!("{}px", format_number(d.value)),
        Some(d) => d.to_string(),
        None => "320px".to_string(),
    }
}

/// `text-anchor` of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("middle") => Self::Middle,
            Some("end") => Self::End,
            _ => Self::Start,
        }
    }

    /// Horizontal shift that puts the anchor point under the text's `x`.
    fn shift(self) -> Option<&'static str> {
        match self {
            Self::Start => None,
            Self::Middle => Some("translateX(-50%)"),
            Self::End => Some("translateX(-100%)"),
        }
    }

    fn text_align(self) -> Option<&'static str> {
        match self {
            Self::Start => None,
            Self::Middle => Some("center"),
            Self::End => Some("end"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(src: &str) -> (String, usize) {
        let mut doc = Document::parse(src).unwrap();
        let count = convert_texts(&mut doc);
        (doc.to_string(), count)
    }

    #[test]
    fn test_empty_text_deleted() {
        let (out, count) = convert(r#"<svg><g/><text x="1"><tspan> </tspan>
</text></svg>"#);
        assert_eq!(count, 0);
        assert_eq!(out, "<svg><g/></svg>");
    }

    #[test]
    fn test_fast_path_math() {
        let (out, count) = convert(r#"<svg><text x="1" y="2">$\alpha$</text></svg>"#);
        assert_eq!(count, 1);
        assert_eq!(
            out,
            concat!(
                r#"<svg><foreignObject x="1" y="2" width="1000" overflow="visible" height="1" style="font-size:16px">"#,
                r#"<p style="margin-top:-320px"><span style="display:inline-block;height:320px"></span>"#,
                r#"<span class="math inline">\(\alpha\)</span></p>"#,
                r#"</foreignObject></svg>"#
            )
        );
    }

    #[test]
    fn test_middle_anchor() {
        let (out, _) = convert(
            r#"<svg><text x="5" y="6" style="font-size:10px;text-anchor:middle;fill:#f00">Hi</text></svg>"#,
        );
        assert!(out.contains(r#"style="font-size:10px;color:#f00;text-align:center""#));
        assert!(out.contains(r#"<p style="margin-top:-200px;transform:translateX(-50%)">"#));
        assert!(out.contains(r#"<span style="display:inline-block;height:200px"></span>Hi</p>"#));
    }

    #[test]
    fn test_end_anchor_and_inline_size() {
        let (out, _) = convert(
            r#"<svg><text text-anchor="end" style="inline-size:120" transform="rotate(5)">a *b*</text></svg>"#,
        );
        assert!(out.starts_with(
            r#"<svg><foreignObject width="120" height="1" transform="rotate(5)" style="font-size:16px;text-align:end">"#
        ));
        assert!(out.contains("translateX(-100%)"));
        assert!(out.contains("<em>b</em>"));
    }

    #[test]
    fn test_runs_flattened_with_font_size() {
        let (out, _) = convert(
            r#"<svg><text x="0" y="0"><tspan style="font-size:2em">a</tspan><tspan>b</tspan></text></svg>"#,
        );
        assert!(out.contains(r#"style="font-size:2em""#));
        assert!(out.contains(r#"height:40em"></span>ab</p>"#));
        assert!(!out.contains("tspan"));
    }

    #[test]
    fn test_single_formula() {
        assert_eq!(single_formula(" $x$ "), Some("x"));
        assert_eq!(single_formula("$a$ and $b$"), None);
        assert_eq!(single_formula("$$"), None);
        assert_eq!(single_formula("x"), None);
    }

    #[test]
    fn test_baseline_marker_height() {
        assert_eq!(baseline_marker_height("12px"), "240px");
        assert_eq!(baseline_marker_height("12"), "240px");
        assert_eq!(baseline_marker_height("0.8rem"), "16rem");
        assert_eq!(baseline_marker_height("medium"), "320px");
    }
}
