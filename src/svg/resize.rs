//! Root `width`/`height` resolution.
//!
//! # Rules
//!
//! | Source units     | Request          | Result                                  |
//! |------------------|------------------|-----------------------------------------|
//! | either relative  | (ignored)        | each value x scale, own unit            |
//! | both absolute    | none             | `px x scale / 16` in `em`               |
//! | both absolute    | width or height  | requested one, other by aspect ratio    |
//! | both absolute    | width and height | both verbatim (no ratio)                |
//!
//! Any invalid source or requested value leaves the root untouched.

use super::dimension::{Dimension, ROOT_FONT_PX, TargetDimension, format_number, round};
use super::dom::Document;

/// Sizing request for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeOptions {
    /// Multiplier applied when no explicit target is given.
    pub scale_factor: Option<f64>,
    /// Requested width (`px`, `cm`, `mm`, `in`, `inch`, `%`).
    pub width: Option<String>,
    /// Requested height, same units as `width`.
    pub height: Option<String>,
}

impl ResizeOptions {
    #[inline]
    fn scale(&self) -> f64 {
        self.scale_factor.unwrap_or(1.0)
    }
}

/// Resolve the final `width`/`height` of the root element in place.
///
/// Returns `true` if the root was modified.
pub fn resize(doc: &mut Document, options: &ResizeOptions) -> bool {
    let root = doc.root_element();
    let (Some(width), Some(height)) = (
        root.attr("width").and_then(Dimension::parse),
        root.attr("height").and_then(Dimension::parse),
    ) else {
        return false;
    };

    let Some((new_width, new_height)) = resolve(width, height, options) else {
        return false;
    };

    let root = doc.root_element_mut();
    root.set_attr("width", new_width);
    root.set_attr("height", new_height);
    true
}

/// Compute the new attribute values, or `None` to leave the root alone.
fn resolve(width: Dimension, height: Dimension, options: &ResizeOptions) -> Option<(String, String)> {
    let scale = options.scale();

    // Relative units resolve in the browser; only the literal can be scaled
    if width.is_relative() || height.is_relative() {
        return Some((
            width.scaled(scale).to_string(),
            height.scaled(scale).to_string(),
        ));
    }

    let px_width = width.to_px()?;
    let px_height = height.to_px()?;
    let ratio = || (px_height > 0.0).then(|| px_width / px_height);

    match (options.width.as_deref(), options.height.as_deref()) {
        (None, None) => Some((to_em(px_width, scale), to_em(px_height, scale))),
        (Some(w), None) => {
            let target = TargetDimension::parse(w)?;
            let other = target.with_value(target.value / ratio()?);
            Some((target.with_value(target.value).to_string(), other.to_string()))
        }
        (None, Some(h)) => {
            let target = TargetDimension::parse(h)?;
            let other = target.with_value(target.value * ratio()?);
            Some((other.to_string(), target.with_value(target.value).to_string()))
        }
        (Some(w), Some(h)) => {
            TargetDimension::parse(w)?;
            TargetDimension::parse(h)?;
            Some((w.to_string(), h.to_string()))
        }
    }
}

fn to_em(px: f64, scale: f64) -> String {
    format!("{}em", format_number(round(scale * px / ROOT_FONT_PX)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(svg: &str, options: ResizeOptions) -> (Document, bool) {
        let mut doc = Document::parse(svg).unwrap();
        let changed = resize(&mut doc, &options);
        (doc, changed)
    }

    fn size(doc: &Document) -> (String, String) {
        let root = doc.root_element();
        (
            root.attr("width").unwrap_or_default().to_string(),
            root.attr("height").unwrap_or_default().to_string(),
        )
    }

    fn opts(width: Option<&str>, height: Option<&str>) -> ResizeOptions {
        ResizeOptions {
            scale_factor: None,
            width: width.map(str::to_string),
            height: height.map(str::to_string),
        }
    }

    #[test]
    fn test_default_converts_to_em() {
        let (doc, changed) = run(
            r#"<svg width="210mm" height="297mm"/>"#,
            ResizeOptions::default(),
        );
        assert!(changed);
        assert_eq!(size(&doc), ("49.6125em".into(), "70.16625em".into()));
    }

    #[test]
    fn test_default_with_scale() {
        let options = ResizeOptions {
            scale_factor: Some(0.5),
            ..Default::default()
        };
        let (doc, _) = run(r#"<svg width="320" height="160px"/>"#, options);
        assert_eq!(size(&doc), ("10em".into(), "5em".into()));
    }

    #[test]
    fn test_mixed_relative_and_percent_untouched() {
        let src = r#"<svg width="50%" height="50mm"><g/></svg>"#;
        let (doc, changed) = run(src, ResizeOptions::default());
        assert!(!changed);
        assert_eq!(doc.to_string(), src);
    }

    #[test]
    fn test_missing_or_invalid_source() {
        let (_, changed) = run(r#"<svg width="10cm"/>"#, ResizeOptions::default());
        assert!(!changed);
        let (_, changed) = run(r#"<svg width="10cm" height="auto"/>"#, ResizeOptions::default());
        assert!(!changed);
    }

    #[test]
    fn test_relative_source_scales_literal() {
        let options = ResizeOptions {
            scale_factor: Some(2.0),
            width: Some("10cm".into()),
            height: None,
        };
        let (doc, changed) = run(r#"<svg width="1.5em" height="30"/>"#, options);
        assert!(changed);
        // Target ignored, each keeps its own unit
        assert_eq!(size(&doc), ("3em".into(), "60".into()));
    }

    #[test]
    fn test_idempotent_with_unit_scale() {
        let (mut doc, _) = run(r#"<svg width="100pt" height="3in"/>"#, ResizeOptions::default());
        let first = size(&doc);
        let options = ResizeOptions {
            scale_factor: Some(1.0),
            ..Default::default()
        };
        resize(&mut doc, &options);
        assert_eq!(size(&doc), first);
    }

    #[test]
    fn test_width_only_keeps_ratio() {
        let (doc, _) = run(r#"<svg width="200" height="100"/>"#, opts(Some("10cm"), None));
        assert_eq!(size(&doc), ("10cm".into(), "5cm".into()));

        let (doc, _) = run(r#"<svg width="300" height="100"/>"#, opts(Some("50%"), None));
        assert_eq!(size(&doc), ("50%".into(), "16.66666667%".into()));
    }

    #[test]
    fn test_height_only_keeps_ratio() {
        let (doc, _) = run(r#"<svg width="2in" height="1in"/>"#, opts(None, Some("3inch")));
        assert_eq!(size(&doc), ("6in".into(), "3in".into()));
    }

    #[test]
    fn test_invalid_target_aborts() {
        let src = r#"<svg width="200" height="100"/>"#;
        let (doc, changed) = run(src, opts(Some("10em"), None));
        assert!(!changed);
        assert_eq!(doc.to_string(), src);

        let (doc, changed) = run(src, opts(Some("10px"), Some("wide")));
        assert!(!changed);
        assert_eq!(doc.to_string(), src);
    }

    #[test]
    fn test_both_targets_verbatim() {
        let (doc, _) = run(
            r#"<svg width="200" height="100"/>"#,
            opts(Some("10.50px"), Some("2inch")),
        );
        assert_eq!(size(&doc), ("10.50px".into(), "2inch".into()));

        let (doc, changed) = run(
            r#"<svg width="200" height="100"/>"#,
            opts(Some("10px"), Some("wide")),
        );
        assert!(!changed);
        assert_eq!(size(&doc), ("200".into(), "100".into()));
    }
}
