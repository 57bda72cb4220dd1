//! The slice of the pandoc JSON AST this filter understands.
//!
//! pandoc encodes every element as `{"t": tag, "c": content}`. Elements the
//! filter acts on are modeled as [`Element`]; everything else stays a
//! `serde_json::Value` and is only walked.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title prefix pandoc 2 gives images that form an implicit figure.
pub const FIGURE_TITLE_PREFIX: &str = "fig:";

/// `[identifier, [classes], [[key, value]]]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn classes(&self) -> &[String] {
        &self.1
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.2
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.1.iter().any(|c| c == class)
    }

    /// Remove `class`, returning whether it was present.
    pub fn take_class(&mut self, class: &str) -> bool {
        let before = self.1.len();
        self.1.retain(|c| c != class);
        self.1.len() != before
    }
}

/// `[url, title]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target(pub String, pub String);

/// `[short caption | null, [blocks]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption(pub Option<Value>, pub Vec<Value>);

/// Content-model elements the filter inspects or produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Element {
    /// Inline image: attributes, alt text inlines, target.
    Image(Attr, Vec<Value>, Target),
    Para(Vec<Value>),
    Plain(Vec<Value>),
    /// pandoc 3 figure block: attributes, caption, body blocks.
    Figure(Attr, Caption, Vec<Value>),
    RawInline(String, String),
    RawBlock(String, String),
}

impl Element {
    /// Tags that deserialize into [`Element`].
    pub const TAGS: [&'static str; 6] = ["Image", "Para", "Plain", "Figure", "RawInline", "RawBlock"];

    /// Typed view of `value`, if it is one of the modeled elements.
    pub fn from_value(value: &Value) -> Option<Self> {
        let tag = value.get("t")?.as_str()?;
        if !Self::TAGS.contains(&tag) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn raw_inline(html: String) -> Self {
        Self::RawInline("html".to_string(), html)
    }

    pub fn raw_block(html: String) -> Self {
        Self::RawBlock("html".to_string(), html)
    }
}

/// Plain text of inlines or blocks, the way pandoc's `stringify` reads them.
pub fn stringify(values: &[Value]) -> String {
    let mut out = String::new();
    for value in values {
        stringify_into(value, &mut out);
    }
    out
}

fn stringify_into(value: &Value, out: &mut String) {
    let Some(tag) = value.get("t").and_then(Value::as_str) else {
        if let Value::Array(items) = value {
            items.iter().for_each(|item| stringify_into(item, out));
        }
        return;
    };
    let content = value.get("c");
    match tag {
        "Str" => {
            if let Some(text) = content.and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "Space" | "SoftBreak" | "LineBreak" => out.push(' '),
        "Code" | "Math" => {
            // [attr | math type, text]
            if let Some(text) = content.and_then(|c| c.get(1)).and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "Quoted" => {
            let quote = match content.and_then(|c| c.get(0)).and_then(|q| q.get("t")) {
                Some(Value::String(kind)) if kind == "SingleQuote" => '\'',
                _ => '"',
            };
            out.push(quote);
            if let Some(inner) = content.and_then(|c| c.get(1)) {
                stringify_into(inner, out);
            }
            out.push(quote);
        }
        // Not part of the visible text
        "RawInline" | "RawBlock" | "Note" => {}
        // Links, images and spans keep their inlines in the second slot
        "Link" | "Image" | "Span" | "Cite" => {
            if let Some(inner) = content.and_then(|c| c.get(1)) {
                stringify_into(inner, out);
            }
        }
        _ => {
            if let Some(content) = content {
                stringify_into(content, out);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image_json() -> Value {
        json!({
            "t": "Image",
            "c": [
                ["fig-a", ["keep-size"], [["width", "10cm"]]],
                [{"t": "Str", "c": "A"}, {"t": "Space"}, {"t": "Emph", "c": [{"t": "Str", "c": "plot"}]}],
                ["plot.svg", "fig:"]
            ]
        })
    }

    #[test]
    fn test_image_from_value() {
        let Some(Element::Image(attr, alt, target)) = Element::from_value(&image_json()) else {
            panic!("expected image");
        };
        assert_eq!(attr.id(), "fig-a");
        assert!(attr.has_class("keep-size"));
        assert_eq!(attr.attributes(), [("width".to_string(), "10cm".to_string())]);
        assert_eq!(stringify(&alt), "A plot");
        assert_eq!(target, Target("plot.svg".into(), "fig:".into()));
    }

    #[test]
    fn test_unmodeled_tags_ignored() {
        assert_eq!(Element::from_value(&json!({"t": "Str", "c": "x"})), None);
        assert_eq!(Element::from_value(&json!({"t": "Space"})), None);
        assert_eq!(Element::from_value(&json!([1, 2])), None);
    }

    #[test]
    fn test_raw_inline_shape() {
        assert_eq!(
            Element::raw_inline("<svg/>".into()).to_value(),
            json!({"t": "RawInline", "c": ["html", "<svg/>"]})
        );
    }

    #[test]
    fn test_take_class() {
        let mut attr = Attr(String::new(), vec!["a".into(), "ignore".into()], vec![]);
        assert!(attr.take_class("ignore"));
        assert!(!attr.take_class("ignore"));
        assert_eq!(attr.classes(), ["a"]);
    }

    #[test]
    fn test_stringify_blocks() {
        let blocks = json!([
            {"t": "Plain", "c": [{"t": "Str", "c": "Energy"}, {"t": "Space"},
                {"t": "Math", "c": [{"t": "InlineMath"}, "E=mc^2"]},
                {"t": "Space"},
                {"t": "Quoted", "c": [{"t": "DoubleQuote"}, [{"t": "Str", "c": "ok"}]]}]}
        ]);
        assert_eq!(stringify(blocks.as_array().unwrap()), "Energy E=mc^2 \"ok\"");
    }
}
