//! Image attributes: sizing requests and the attributes copied onto `<svg>`.
//!
//! ```text
//! ![](plot.svg){#p .wide width=10cm scale-factor=2 title=Plot align=left}
//!
//! sizing:  width=10cm  scale-factor=2
//! root:    id="p" class="wide" title="Plot" data-align="left"
//! ```

use super::ast::Attr;
use crate::svg::ResizeOptions;
use crate::svg::dom::Element;

/// Class that leaves the image to pandoc.
pub const IGNORE_CLASS: &str = "ignore";

/// Class that skips resizing.
pub const KEEP_SIZE_CLASS: &str = "keep-size";

/// Global HTML attributes, copied verbatim. Anything else becomes `data-*`.
const HTML_ATTRIBUTES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "lang",
    "nonce",
    "part",
    "popover",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
    "writingsuggestions",
];

/// Prefixes of attribute families that are valid on any element.
const HTML_ATTRIBUTE_PREFIXES: &[&str] = &["aria-", "data-", "on"];

/// Whether `key` is a known HTML attribute name.
pub fn is_html_attribute(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    HTML_ATTRIBUTES.contains(&key.as_str())
        || HTML_ATTRIBUTE_PREFIXES
            .iter()
            .any(|prefix| key.len() > prefix.len() && key.starts_with(prefix))
}

/// Name an image attribute gets on the `<svg>` root.
pub fn projected_name(key: &str) -> String {
    if is_html_attribute(key) {
        key.to_string()
    } else {
        format!("data-{key}")
    }
}

/// Image attributes split into sizing and pass-through parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAttrs {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    /// Raw `scale-factor` value, validated by [`ImageAttrs::scale_factor`].
    pub scale_factor: Option<String>,
    pub keep_size: bool,
    /// Remaining key/values, in document order.
    pub extra: Vec<(String, String)>,
}

impl ImageAttrs {
    /// Split `attr`. The `keep-size` class is consumed here; `ignore` must
    /// already have been handled by the caller.
    pub fn from_attr(attr: &Attr) -> Self {
        let mut out = Self {
            id: Some(attr.id().to_string()).filter(|id| !id.is_empty()),
            ..Default::default()
        };
        for class in attr.classes() {
            if class == KEEP_SIZE_CLASS {
                out.keep_size = true;
            } else {
                out.classes.push(class.clone());
            }
        }
        for (key, value) in attr.attributes() {
            match key.as_str() {
                "width" => out.width = Some(value.clone()),
                "height" => out.height = Some(value.clone()),
                "scale-factor" => out.scale_factor = Some(value.clone()),
                _ => out.extra.push((key.clone(), value.clone())),
            }
        }
        out
    }

    /// Parsed `scale-factor`: `Ok(None)` when absent, `Err(raw)` when it is
    /// not a positive finite number.
    pub fn scale_factor(&self) -> Result<Option<f64>, &str> {
        let Some(raw) = self.scale_factor.as_deref() else {
            return Ok(None);
        };
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
            _ => Err(raw),
        }
    }

    /// Sizing request, or `None` for `keep-size`.
    pub fn resize_options(&self, scale_factor: Option<f64>) -> Option<ResizeOptions> {
        (!self.keep_size).then(|| ResizeOptions {
            scale_factor,
            width: self.width.clone(),
            height: self.height.clone(),
        })
    }

    /// Copy identity, classes and extra attributes onto the `<svg>` root.
    ///
    /// `with_id` is false for figures, whose `<figure>` carries the id.
    pub fn apply_to_root(&self, root: &mut Element, with_id: bool) {
        if with_id && let Some(id) = &self.id {
            root.set_attr("id", id.as_str());
        }

        if !self.classes.is_empty() {
            let mut classes: Vec<&str> = root
                .attr("class")
                .map(|c| c.split_whitespace().collect())
                .unwrap_or_default();
            for class in &self.classes {
                if !classes.contains(&class.as_str()) {
                    classes.push(class);
                }
            }
            let joined = classes.join(" ");
            root.set_attr("class", joined);
        }

        for (key, value) in &self.extra {
            root.set_attr(projected_name(key), value.as_str());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(id: &str, classes: &[&str], kvs: &[(&str, &str)]) -> Attr {
        Attr(
            id.to_string(),
            classes.iter().map(|c| c.to_string()).collect(),
            kvs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        )
    }

    #[test]
    fn test_projected_names() {
        assert_eq!(projected_name("title"), "title");
        assert_eq!(projected_name("aria-label"), "aria-label");
        assert_eq!(projected_name("data-x"), "data-x");
        assert_eq!(projected_name("align"), "data-align");
        assert_eq!(projected_name("aria-"), "data-aria-");
    }

    #[test]
    fn test_split() {
        let attrs = ImageAttrs::from_attr(&attr(
            "p",
            &["keep-size", "wide"],
            &[("width", "10cm"), ("scale-factor", "2"), ("align", "left")],
        ));
        assert_eq!(attrs.id.as_deref(), Some("p"));
        assert!(attrs.keep_size);
        assert_eq!(attrs.classes, ["wide"]);
        assert_eq!(attrs.width.as_deref(), Some("10cm"));
        assert_eq!(attrs.scale_factor(), Ok(Some(2.0)));
        assert_eq!(attrs.extra, [("align".to_string(), "left".to_string())]);
        assert_eq!(attrs.resize_options(Some(2.0)), None);
    }

    #[test]
    fn test_invalid_scale_factor() {
        for raw in ["big", "-1", "0", "NaN"] {
            let attrs = ImageAttrs::from_attr(&attr("", &[], &[("scale-factor", raw)]));
            assert_eq!(attrs.scale_factor(), Err(raw));
        }
    }

    #[test]
    fn test_apply_to_root() {
        let attrs = ImageAttrs::from_attr(&attr(
            "p",
            &["wide", "old"],
            &[("title", "Plot"), ("align", "left")],
        ));
        let mut root = Element::new("svg");
        root.set_attr("class", "old");
        attrs.apply_to_root(&mut root, true);
        assert_eq!(root.attr("id"), Some("p"));
        assert_eq!(root.attr("class"), Some("old wide"));
        assert_eq!(root.attr("title"), Some("Plot"));
        assert_eq!(root.attr("data-align"), Some("left"));

        let mut root = Element::new("svg");
        attrs.apply_to_root(&mut root, false);
        assert_eq!(root.attr("id"), None);
    }
}
