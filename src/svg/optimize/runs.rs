//! Run-redundancy folding.
//!
//! A `<tspan>` that repeats its parent's position or style adds nothing.
//! Redundant attributes and declarations are dropped, and a run left without
//! any attribute is replaced by its own content.

use crate::svg::dom::{Document, NodeId};

/// Fold redundant runs. Returns the number of unwrapped runs.
pub fn fold_runs(doc: &mut Document) -> usize {
    let runs = doc.find_all(doc.root(), "tspan");
    runs.into_iter()
        .filter(|run| fold_run(doc, *run))
        .count()
}

/// Returns `true` if the run was unwrapped.
fn fold_run(doc: &mut Document, run: NodeId) -> bool {
    let Some(parent) = doc.parent(run) else {
        return false;
    };
    let Some(parent_elem) = doc.element(parent).cloned() else {
        return false;
    };
    let parent_style = parent_elem.style();

    let Some(elem) = doc.element_mut(run) else {
        return false;
    };

    for key in ["x", "y"] {
        if elem.attr(key).is_some() && elem.attr(key) == parent_elem.attr(key) {
            elem.remove_attr(key);
        }
    }

    if elem.has_attr("style") {
        let mut style = elem.style();
        let before = style.len();
        style.retain(|prop, decl| parent_style.declaration(prop) != Some(decl));
        if style.len() != before {
            elem.set_style(&style);
        }
    }

    if elem.attr_count() > 0 {
        return false;
    }
    doc.unwrap(run);
    true
}
