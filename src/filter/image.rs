//! One image reference to inline `<svg>` markup.
//!
//! ```text
//! url ─► decode ─► .svg? ─► classes ─► format ─► resolve ─► read ─► parse
//!                                                                     │
//!                      markup ◄── project attrs ◄── transform_svg ◄───┘
//! ```

use super::Filter;
use super::ast::Attr;
use super::attrs::{IGNORE_CLASS, ImageAttrs};
use crate::debug;
use crate::diagnostics::WarnKey;
use crate::svg::{Document, TransformOptions, XmlError, transform_svg};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an image reference was left to pandoc.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("not an SVG file")]
    NotSvg,

    #[error("marked `.{IGNORE_CLASS}`")]
    Ignored,

    #[error("output format `{0}` is not supported")]
    UnsupportedFormat(String),

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid SVG in `{}`", path.display())]
    InvalidSvg {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
}

/// Where the markup ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inline,
    /// Inside `<figure>`, which takes the identifier.
    Figure,
}

impl Filter {
    /// Render the image at `url` as inline `<svg>` markup.
    ///
    /// On [`SkipReason::Ignored`] the `ignore` class has been removed from
    /// `attr` and the caller should re-emit the image with it.
    pub fn render_image(
        &self,
        attr: &mut Attr,
        url: &str,
        placement: Placement,
    ) -> Result<String, SkipReason> {
        let path = decode_url(url);
        if !has_svg_extension(&path) {
            return Err(SkipReason::NotSvg);
        }
        if attr.take_class(IGNORE_CLASS) {
            return Err(SkipReason::Ignored);
        }
        if !self.format_supported() {
            self.diag.output_format(&self.format);
            return Err(SkipReason::UnsupportedFormat(self.format.clone()));
        }

        let attrs = ImageAttrs::from_attr(attr);
        let scale_factor = attrs.scale_factor().unwrap_or_else(|raw| {
            self.diag.warn_once(
                WarnKey::Attribute(format!("scale-factor={raw}")),
                format_args!("invalid scale-factor `{raw}`, using the default"),
            );
            None
        });

        let Some(file) = self.config.filter.resolve(&path) else {
            self.diag.missing_file(Path::new(path.as_ref()));
            return Err(SkipReason::MissingFile(PathBuf::from(path.as_ref())));
        };
        let Ok(markup) = fs::read_to_string(&file) else {
            self.diag.missing_file(&file);
            return Err(SkipReason::MissingFile(file));
        };
        let mut doc = match Document::parse(&markup) {
            Ok(doc) => doc,
            Err(source) => {
                self.diag.warn_once(
                    WarnKey::InvalidSvg(file.clone()),
                    format_args!("{} is not valid SVG: {source}", file.display()),
                );
                return Err(SkipReason::InvalidSvg { path: file, source });
            }
        };

        let options = TransformOptions {
            resize: attrs.resize_options(scale_factor),
            minify: self.config.minify.options(),
            convert_text: self.config.text.enable,
        };
        transform_svg(&mut doc, &options, self.minifier(), &self.diag);
        attrs.apply_to_root(doc.root_element_mut(), placement == Placement::Inline);

        debug!("image"; "inlined {}", file.display());
        Ok(doc.to_xml())
    }
}

/// Percent-decoded path; undecodable input is used as written.
fn decode_url(url: &str) -> Cow<'_, str> {
    percent_decode_str(url)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(url))
}

fn has_svg_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use std::path::Path;

    const SOURCE: &str = r#"<svg width="160" height="80" class="drawing"><rect width="1" height="1"/></svg>"#;

    fn filter_in(dir: &Path, format: &str) -> Filter {
        let mut config = FilterConfig::default();
        config.filter.resource_path = vec![dir.to_path_buf()];
        config.minify.enable = false;
        Filter::new(config, Some(format.to_string()))
    }

    fn attr(classes: &[&str], kvs: &[(&str, &str)]) -> Attr {
        Attr(
            "plot".to_string(),
            classes.iter().map(|c| c.to_string()).collect(),
            kvs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        )
    }

    #[test]
    fn test_decode_url() {
        assert_eq!(decode_url("my%20plot.svg"), "my plot.svg");
        assert_eq!(decode_url("%FF.svg"), "%FF.svg");
        assert!(has_svg_extension("a/b.SVG"));
        assert!(!has_svg_extension("a/b.png"));
        assert!(!has_svg_extension("svg"));
    }

    #[test]
    fn test_render_inline() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my plot.svg"), SOURCE).unwrap();
        let filter = filter_in(dir.path(), "html5");

        let out = filter
            .render_image(
                &mut attr(&["wide"], &[("align", "left")]),
                "my%20plot.svg",
                Placement::Inline,
            )
            .unwrap();
        assert!(out.starts_with(r#"<svg width="10em" height="5em" class="drawing wide" id="plot" data-align="left">"#));
    }

    #[test]
    fn test_keep_size_and_figure_placement() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.svg"), SOURCE).unwrap();
        let filter = filter_in(dir.path(), "html");

        let out = filter
            .render_image(&mut attr(&["keep-size"], &[]), "a.svg", Placement::Figure)
            .unwrap();
        assert!(out.starts_with(r#"<svg width="160" height="80" class="drawing">"#));
    }

    #[test]
    fn test_skips() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.svg"), "<svg><g></svg>").unwrap();
        let filter = filter_in(dir.path(), "html");

        let mut ignored = attr(&["ignore", "x"], &[]);
        assert!(matches!(
            filter.render_image(&mut ignored, "a.svg", Placement::Inline),
            Err(SkipReason::Ignored)
        ));
        assert_eq!(ignored.classes(), ["x"]);

        assert!(matches!(
            filter.render_image(&mut attr(&[], &[]), "a.png", Placement::Inline),
            Err(SkipReason::NotSvg)
        ));
        assert!(matches!(
            filter.render_image(&mut attr(&[], &[]), "gone.svg", Placement::Inline),
            Err(SkipReason::MissingFile(_))
        ));
        assert!(matches!(
            filter.render_image(&mut attr(&[], &[]), "bad.svg", Placement::Inline),
            Err(SkipReason::InvalidSvg { .. })
        ));
        assert!(filter.diag.was_reported(&WarnKey::MissingFile("gone.svg".into())));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.svg"), SOURCE).unwrap();
        let filter = filter_in(dir.path(), "latex");

        assert!(matches!(
            filter.render_image(&mut attr(&[], &[]), "a.svg", Placement::Inline),
            Err(SkipReason::UnsupportedFormat(f)) if f == "latex"
        ));
        assert!(filter.diag.was_reported(&WarnKey::OutputFormat("latex".into())));
    }

    #[test]
    fn test_invalid_scale_factor_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.svg"), SOURCE).unwrap();
        let filter = filter_in(dir.path(), "html");

        let out = filter
            .render_image(&mut attr(&[], &[("scale-factor", "huge")]), "a.svg", Placement::Inline)
            .unwrap();
        assert!(out.contains(r#"width="10em""#));
        assert!(filter.diag.was_reported(&WarnKey::Attribute("scale-factor=huge".into())));
    }
}
