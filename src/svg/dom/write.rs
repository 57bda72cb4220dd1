//! [`Document`] -> XML text.
//!
//! Output is meant to be pasted into an HTML page as inline SVG, so content
//! under `<foreignObject>` follows HTML rules: only void elements may be
//! self-closing (`<span/>` would swallow its following siblings).

use super::{Document, NodeId, NodeKind};
use crate::utils::html::{escape, escape_attr, is_void_element};

/// Serialize the whole tree (no XML declaration).
pub fn write(doc: &Document) -> String {
    let mut out = String::with_capacity(1024);
    write_node(doc, doc.root(), false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, in_html: bool, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(text) => out.push_str(&escape(text)),
        NodeKind::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(elem) => {
            out.push('<');
            out.push_str(&elem.name);
            for (key, value) in elem.attrs() {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }

            let children = doc.children(id);
            if children.is_empty() && (!in_html || is_void_element(&elem.name)) {
                out.push_str("/>");
                return;
            }
            out.push('>');

            let child_html = in_html || elem.is("foreignObject");
            for child in children {
                write_node(doc, *child, child_html, out);
            }

            out.push_str("</");
            out.push_str(&elem.name);
            out.push('>');
        }
    }
}
