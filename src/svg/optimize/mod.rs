//! SVG optimization.
//!
//! Four stages, always in this order:
//!
//! 1. [`minify`]: external structural minification, re-parsed into the tree
//! 2. [`translate`]: fold `translate(..)` into `x`/`y`
//! 3. [`runs`]: drop `<tspan>` attributes that repeat the parent
//! 4. [`compat`]: `context-stroke` inside markers becomes `#000`

pub mod compat;
pub mod minify;
pub mod runs;
pub mod translate;

pub use minify::{Minifier, MinifyOptions, Svgo};

use super::dom::Document;
use crate::debug;
use crate::diagnostics::Diagnostics;

/// Run all optimization stages on `doc`.
///
/// Without a minifier (disabled or unavailable) the first stage is skipped.
/// A failing minifier is reported once and leaves the tree as it was.
pub fn optimize(
    doc: &mut Document,
    minifier: Option<&dyn Minifier>,
    options: &MinifyOptions,
    diag: &Diagnostics,
) {
    if let Some(minifier) = minifier {
        minify_tree(doc, minifier, options, diag);
    }

    let folded = translate::fold_translations(doc);
    let unwrapped = runs::fold_runs(doc);
    let rewritten = compat::rewrite_context_paint(doc);
    debug!(
        "svg";
        "folded {folded} translations, unwrapped {unwrapped} runs, rewrote {rewritten} marker paints"
    );
}

fn minify_tree(
    doc: &mut Document,
    minifier: &dyn Minifier,
    options: &MinifyOptions,
    diag: &Diagnostics,
) {
    let markup = doc.to_xml();
    let result = minifier
        .minify(&markup, options)
        .and_then(|out| Document::parse(&out).map_err(anyhow::Error::from));

    match result {
        Ok(minified) => *doc = minified,
        Err(err) => {
            diag.tool(
                minifier.name(),
                format_args!("`{}` failed, images are not minified: {err:#}", minifier.name()),
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WarnKey;

    /// Drops comments, which is enough to observe the stage ran.
    struct StripComments;

    impl Minifier for StripComments {
        fn name(&self) -> &str {
            "strip"
        }

        fn minify(&self, markup: &str, _: &MinifyOptions) -> anyhow::Result<String> {
            let re = regex::Regex::new(r"<!--.*?-->").unwrap();
            Ok(re.replace_all(markup, "").into_owned())
        }
    }

    struct Broken;

    impl Minifier for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn minify(&self, _: &str, _: &MinifyOptions) -> anyhow::Result<String> {
            Ok("<svg".into())
        }
    }

    const SRC: &str = r#"<svg><!-- editor --><marker><path stroke="context-stroke"/></marker><text x="1" y="2" transform="translate(1 1)"><tspan x="1" y="2">a</tspan></text></svg>"#;

    #[test]
    fn test_stages_in_order() {
        let mut doc = Document::parse(SRC).unwrap();
        let diag = Diagnostics::new();
        optimize(&mut doc, Some(&StripComments), &MinifyOptions::default(), &diag);
        // Folding puts the run on its parent's position, then run folding drops it
        assert_eq!(
            doc.to_string(),
            r##"<svg><marker><path stroke="#000"/></marker><text x="2" y="3">a</text></svg>"##
        );
        assert_eq!(diag.count(), 0);
    }

    #[test]
    fn test_failing_minifier_keeps_tree() {
        let mut doc = Document::parse(SRC).unwrap();
        let diag = Diagnostics::new();
        optimize(&mut doc, Some(&Broken), &MinifyOptions::default(), &diag);
        assert!(doc.to_string().contains("<!-- editor -->"));
        assert!(diag.was_reported(&WarnKey::Tool("broken".into())));

        // Reported once
        optimize(&mut doc, Some(&Broken), &MinifyOptions::default(), &diag);
        assert_eq!(diag.count(), 1);
    }

    #[test]
    fn test_without_minifier() {
        let mut doc = Document::parse(SRC).unwrap();
        optimize(&mut doc, None, &MinifyOptions::default(), &Diagnostics::new());
        assert!(doc.to_string().starts_with("<svg><!-- editor -->"));
    }
}
