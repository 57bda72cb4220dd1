//! SVG document transformation.
//!
//! # Pipeline
//!
//! ```text
//! Document ─► resize ─► optimize ─► text ─► Document
//!             (units)   (minify,    (<text> → <foreignObject>)
//!                        fold, compat)
//! ```
//!
//! # Modules
//!
//! | Module             | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | [`dimension`]      | Length parsing, unit conversion, rounding      |
//! | [`transform_list`] | `transform` attribute terms                    |
//! | [`dom`]            | Arena tree, XML parse/write, inline style      |
//! | [`resize`]         | Root `width`/`height` resolution               |
//! | [`optimize`]       | Minification and tree clean-ups               |
//! | [`text`]           | Text runs to HTML blocks                       |

pub mod dimension;
pub mod dom;
pub mod optimize;
pub mod resize;
pub mod text;
pub mod transform_list;

pub use dom::{Document, XmlError};
pub use optimize::{Minifier, MinifyOptions};
pub use resize::ResizeOptions;

use crate::debug;
use crate::diagnostics::Diagnostics;

/// Per-image pipeline settings.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Sizing request; `None` keeps the source size (`keep-size`).
    pub resize: Option<ResizeOptions>,
    pub minify: MinifyOptions,
    /// Replace `<text>` with `<foreignObject>` blocks.
    pub convert_text: bool,
}

/// Run resize, optimize and text conversion on `doc`, in that order.
pub fn transform_svg(
    doc: &mut Document,
    options: &TransformOptions,
    minifier: Option<&dyn Minifier>,
    diag: &Diagnostics,
) {
    if let Some(resize) = &options.resize
        && resize::resize(doc, resize)
    {
        let root = doc.root_element();
        debug!(
            "svg";
            "resized to {} x {}",
            root.attr("width").unwrap_or_default(),
            root.attr("height").unwrap_or_default()
        );
    }

    optimize::optimize(doc, minifier, &options.minify, diag);

    if options.convert_text {
        let converted = text::convert_texts(doc);
        debug!("svg"; "converted {converted} text elements");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str, options: &TransformOptions) -> String {
        let mut doc = Document::parse(src).unwrap();
        transform_svg(&mut doc, options, None, &Diagnostics::new());
        doc.to_string()
    }

    #[test]
    fn test_full_pipeline() {
        let options = TransformOptions {
            resize: Some(ResizeOptions::default()),
            convert_text: true,
            ..Default::default()
        };
        let out = run(
            r#"<svg width="160" height="80"><text x="1" y="2" transform="translate(1 1)"><tspan x="1" y="2">Hi</tspan></text></svg>"#,
            &options,
        );
        assert!(out.starts_with(r#"<svg width="10em" height="5em"><foreignObject x="2" y="3" width="1000""#));
        assert!(out.contains("Hi</p></foreignObject>"));
        assert!(!out.contains("transform"));
    }

    #[test]
    fn test_keep_size_and_no_text() {
        let src = r#"<svg width="160" height="80"><text>Hi</text></svg>"#;
        assert_eq!(run(src, &TransformOptions::default()), src);
    }
}
