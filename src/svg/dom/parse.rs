//! XML text -> [`Document`].
//!
//! Whitespace is kept as-is (text nodes inside `<text>` are significant).
//! The XML declaration, doctype and processing instructions are dropped;
//! comments are kept only inside the root element.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::{Document, Element, NodeId, NodeKind};

/// Failure to read an SVG file as a tree.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("no root element")]
    NoRoot,

    #[error("unexpected second root element `{0}`")]
    MultipleRoots(String),
}

/// Parse an SVG (or any XML) document.
pub fn parse(text: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut builder = Builder::default();

    loop {
        let event = reader.read_event().map_err(|err| XmlError::Syntax {
            position: reader.buffer_position(),
            message: err.to_string(),
        })?;
        let syntax = |message: String| XmlError::Syntax {
            position: reader.buffer_position(),
            message,
        };

        match event {
            Event::Start(e) => {
                let element = element_from_start(&reader, &e);
                let id = builder.open(element)?;
                builder.stack.push(id);
            }
            Event::Empty(e) => {
                let element = element_from_start(&reader, &e);
                builder.open(element)?;
            }
            Event::End(_) => {
                builder.stack.pop();
            }
            Event::Text(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| syntax(err.to_string()))?;
                builder.text(&text);
            }
            Event::GeneralRef(e) => {
                let name = e.decode().map_err(|err| syntax(err.to_string()))?;
                let entity = format!("&{name};");
                let resolved = quick_xml::escape::unescape(&entity)
                    .map(Cow::into_owned)
                    .unwrap_or(entity);
                builder.text(&resolved);
            }
            Event::CData(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| syntax(err.to_string()))?;
                builder.leaf(NodeKind::CData(text.into_owned()));
            }
            Event::Comment(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| syntax(err.to_string()))?;
                builder.leaf(NodeKind::Comment(text.into_owned()));
            }
            Event::Eof => break,
            // Declaration, doctype, processing instructions
            _ => {}
        }
    }

    builder.doc.ok_or(XmlError::NoRoot)
}

/// Incremental tree construction state.
#[derive(Default)]
struct Builder {
    doc: Option<Document>,
    stack: Vec<NodeId>,
}

impl Builder {
    /// Attach a new element under the current parent (or make it the root).
    fn open(&mut self, element: Element) -> Result<NodeId, XmlError> {
        match (&mut self.doc, self.stack.last()) {
            (Some(doc), Some(parent)) => {
                let parent = *parent;
                let id = doc.create_element(element);
                doc.append(parent, id);
                Ok(id)
            }
            (Some(_), None) => Err(XmlError::MultipleRoots(element.name)),
            (None, _) => {
                let doc = Document::new(element);
                let root = doc.root();
                self.doc = Some(doc);
                Ok(root)
            }
        }
    }

    /// Append character data, merging with a preceding text node.
    fn text(&mut self, text: &str) {
        let (Some(doc), Some(parent)) = (&mut self.doc, self.stack.last().copied()) else {
            return;
        };
        if let Some(last) = doc.children(parent).last().copied()
            && let NodeKind::Text(existing) = doc.kind_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let id = doc.create_text(text);
        doc.append(parent, id);
    }

    /// Append a CDATA or comment node inside the root.
    fn leaf(&mut self, kind: NodeKind) {
        let (Some(doc), Some(parent)) = (&mut self.doc, self.stack.last().copied()) else {
            return;
        };
        let id = doc.create(kind);
        doc.append(parent, id);
    }
}

/// Build an [`Element`] from a start tag. Undecodable attributes are skipped.
fn element_from_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Element {
    let decoder = reader.decoder();
    let name = decoder
        .decode(e.name().as_ref())
        .map(Cow::into_owned)
        .unwrap_or_default();
    let mut element = Element::new(name);

    for attr in e.attributes().flatten() {
        let Ok(key) = decoder.decode(attr.key.as_ref()) else {
            continue;
        };
        let Ok(raw) = decoder.decode(&attr.value) else {
            continue;
        };
        let value = quick_xml::escape::unescape(&raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.into_owned());
        element.set_attr(key.into_owned(), value);
    }
    element
}
