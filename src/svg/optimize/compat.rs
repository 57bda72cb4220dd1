//! Context-paint compatibility rewrite.
//!
//! Several browsers do not implement `context-stroke`, so markers painted with
//! it vanish. Inside `<marker>` subtrees it is replaced by black.

use crate::svg::dom::{Declaration, Document, Element};

const CONTEXT_PAINT: &str = "context-stroke";
const FALLBACK_PAINT: &str = "#000";
const PAINT_PROPS: [&str; 2] = ["fill", "stroke"];

/// Rewrite context paint inside markers. Returns the number of changed elements.
pub fn rewrite_context_paint(doc: &mut Document) -> usize {
    let nodes: Vec<_> = doc
        .find_all(doc.root(), "marker")
        .into_iter()
        .flat_map(|marker| doc.descendants(marker))
        .collect();

    let mut changed = 0;
    for id in nodes {
        if let Some(elem) = doc.element_mut(id)
            && rewrite_element(elem)
        {
            changed += 1;
        }
    }
    changed
}

fn rewrite_element(elem: &mut Element) -> bool {
    let mut changed = false;

    let mut style = elem.style();
    for prop in PAINT_PROPS {
        if let Some(decl) = style.declaration(prop)
            && decl.value == CONTEXT_PAINT
        {
            let important = decl.important;
            style.set_declaration(
                prop,
                Declaration {
                    value: FALLBACK_PAINT.to_string(),
                    important,
                },
            );
            changed = true;
        }
    }
    if changed {
        elem.set_style(&style);
    }

    for prop in PAINT_PROPS {
        if elem.attr(prop) == Some(CONTEXT_PAINT) {
            elem.set_attr(prop, FALLBACK_PAINT);
            changed = true;
        }
    }
    changed
}
