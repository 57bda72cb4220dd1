//! Translation folding.
//!
//! `translate(dx, dy)` on an element whose own position and the positions of
//! all its direct element children are plain numbers is folded into those
//! `x`/`y` attributes:
//!
//! ```text
//! <text x="1" y="2" transform="translate(-1 -2) scale(1 0.5)"><tspan x="1" y="2">
//! <text x="0" y="0" transform="scale(1 0.5)"><tspan x="0" y="0">
//! ```

use crate::svg::dimension::{format_number, round};
use crate::svg::dom::{Document, NodeId};
use crate::svg::transform_list::TransformList;
use std::iter;

/// Fold translations across the tree. Returns the number of folded elements.
pub fn fold_translations(doc: &mut Document) -> usize {
    let root = doc.root();
    let nodes: Vec<NodeId> = iter::once(root).chain(doc.descendants(root)).collect();
    nodes
        .into_iter()
        .filter(|id| fold_element(doc, *id).is_some())
        .count()
}

fn fold_element(doc: &mut Document, id: NodeId) -> Option<()> {
    let mut list = TransformList::parse(doc.element(id)?.attr("transform")?)?;
    let (index, (dx, dy)) = list.find_translate()?;

    let targets: Vec<NodeId> = iter::once(id).chain(doc.element_children(id)).collect();
    let mut positions = Vec::with_capacity(targets.len());
    for target in targets {
        let elem = doc.element(target)?;
        let x: f64 = elem.attr("x")?.trim().parse().ok()?;
        let y: f64 = elem.attr("y")?.trim().parse().ok()?;
        positions.push((target, x, y));
    }

    for (target, x, y) in positions {
        let elem = doc.element_mut(target)?;
        elem.set_attr("x", format_number(round(x + dx)));
        elem.set_attr("y", format_number(round(y + dy)));
    }

    list.remove(index);
    let elem = doc.element_mut(id)?;
    if list.is_empty() {
        elem.remove_attr("transform");
    } else {
        elem.set_attr("transform", list.to_string());
    }
    Some(())
}
