//! Markdown to HTML nodes, rendered straight into a [`Document`] arena.
//!
//! Text labels are written in markdown with `$...$` math. Math is emitted in
//! the delimiter form MathJax and KaTeX auto-render pick up from the page:
//! `<span class="math inline">\(..\)</span>`.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::svg::dom::{Document, Element, NodeId};
use crate::utils::html::{is_void_element, unescape};

/// Render `markdown` into detached nodes of `doc`, returning the top-level ones.
pub fn render(doc: &mut Document, markdown: &str) -> Vec<NodeId> {
    let mut renderer = Renderer {
        doc,
        stack: Vec::new(),
        roots: Vec::new(),
        table: TableState::default(),
    };
    for event in Parser::new_ext(markdown, options()) {
        renderer.handle_event(event);
    }
    renderer.roots
}

/// `<span class="math inline">\(formula\)</span>`, detached.
pub fn inline_math(doc: &mut Document, formula: &str) -> NodeId {
    math(doc, formula, false)
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_MATH);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

fn math(doc: &mut Document, formula: &str, display: bool) -> NodeId {
    let (class, open, close) = if display {
        ("math display", r"\[", r"\]")
    } else {
        ("math inline", r"\(", r"\)")
    };
    let mut span = Element::new("span");
    span.set_attr("class", class);
    let span = doc.create_element(span);
    let text = doc.create_text(format!("{open}{formula}{close}"));
    doc.append(span, text);
    span
}

/// Who opened a stack frame.
#[derive(Debug, PartialEq, Eq)]
enum Opener {
    /// A markdown container, closed by its end event.
    Markdown,
    /// An inline HTML start tag waiting for its `</name>`.
    Html(String),
}

struct Frame {
    id: NodeId,
    opener: Opener,
}

/// Position inside the table being rendered.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

struct Renderer<'a> {
    doc: &'a mut Document,
    stack: Vec<Frame>,
    roots: Vec<NodeId>,
    table: TableState,
}

impl Renderer<'_> {
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                let id = self.element("code", []);
                let text = self.doc.create_text(code.to_string());
                self.doc.append(id, text);
                self.add_node(id);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.add_raw_html(&html),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_empty("br", []),
            Event::Rule => self.add_empty("hr", []),
            Event::FootnoteReference(name) => {
                let id = self.element("sup", [("class", "footnote-ref")]);
                let text = self.doc.create_text(format!("[{name}]"));
                self.doc.append(id, text);
                self.add_node(id);
            }
            Event::TaskListMarker(checked) => {
                let id = self.element("input", [("type", "checkbox"), ("disabled", "")]);
                if checked && let Some(e) = self.doc.element_mut(id) {
                    e.set_attr("checked", "");
                }
                self.add_node(id);
            }
            Event::InlineMath(formula) => {
                let id = math(self.doc, &formula, false);
                self.add_node(id);
            }
            Event::DisplayMath(formula) => {
                let id = math(self.doc, &formula, true);
                self.add_node(id);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Markdown structure
    // ------------------------------------------------------------------------

    fn start_tag(&mut self, tag: Tag) {
        let id = match tag {
            Tag::Paragraph => self.element("p", []),
            Tag::Heading { level, id, .. } => {
                let elem = self.element(heading_tag(level), []);
                if let Some(anchor) = id
                    && let Some(e) = self.doc.element_mut(elem)
                {
                    e.set_attr("id", anchor.to_string());
                }
                elem
            }
            Tag::BlockQuote(_) => self.element("blockquote", []),
            Tag::CodeBlock(kind) => {
                let pre = self.element("pre", []);
                self.push(pre);
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        let class = format!("language-{lang}");
                        self.element("code", [("class", class.as_str())])
                    }
                    _ => self.element("code", []),
                }
            }
            Tag::List(Some(start)) if start != 1 => {
                let start = start.to_string();
                self.element("ol", [("start", start.as_str())])
            }
            Tag::List(Some(_)) => self.element("ol", []),
            Tag::List(None) => self.element("ul", []),
            Tag::Item => self.element("li", []),
            Tag::FootnoteDefinition(_) => self.element("div", [("class", "footnote")]),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..Default::default()
                };
                self.element("table", [])
            }
            // Header cells come without a row of their own
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                let thead = self.element("thead", []);
                self.push(thead);
                self.element("tr", [])
            }
            Tag::TableRow => {
                self.table.cell = 0;
                self.element("tr", [])
            }
            Tag::TableCell => {
                let name = if self.table.in_head { "th" } else { "td" };
                let align = match self.table.alignments.get(self.table.cell) {
                    Some(Alignment::Left) => Some("text-align: left"),
                    Some(Alignment::Center) => Some("text-align: center"),
                    Some(Alignment::Right) => Some("text-align: right"),
                    Some(Alignment::None) | None => None,
                };
                self.table.cell += 1;
                match align {
                    Some(style) => self.element(name, [("style", style)]),
                    None => self.element(name, []),
                }
            }
            Tag::Emphasis => self.element("em", []),
            Tag::Strong => self.element("strong", []),
            Tag::Strikethrough => self.element("del", []),
            Tag::Superscript => self.element("sup", []),
            Tag::Subscript => self.element("sub", []),
            Tag::Link {
                dest_url, title, ..
            } => {
                let id = self.element("a", [("href", &*dest_url)]);
                if !title.is_empty()
                    && let Some(e) = self.doc.element_mut(id)
                {
                    e.set_attr("title", title.to_string());
                }
                id
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let id = self.element("img", [("src", &*dest_url)]);
                if !title.is_empty()
                    && let Some(e) = self.doc.element_mut(id)
                {
                    e.set_attr("title", title.to_string());
                }
                id
            }
            Tag::DefinitionList => self.element("dl", []),
            Tag::DefinitionListTitle => self.element("dt", []),
            Tag::DefinitionListDefinition => self.element("dd", []),
            // Containers without an element of their own
            Tag::HtmlBlock | Tag::MetadataBlock(_) => return,
        };
        self.push(id);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::CodeBlock => {
                self.pop_markdown();
                self.pop_markdown();
            }
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.pop_markdown();
                self.pop_markdown();
            }
            TagEnd::Image => {
                // Alt text arrives as children; `img` is void
                if let Some(id) = self.pop_markdown() {
                    let alt = self.doc.text_content(id);
                    self.doc.clear_children(id);
                    if let Some(e) = self.doc.element_mut(id) {
                        e.set_attr("alt", alt);
                    }
                }
            }
            _ => {
                self.pop_markdown();
            }
        }
    }

    /// Close the innermost markdown frame, along with unclosed HTML frames above it.
    fn pop_markdown(&mut self) -> Option<NodeId> {
        while let Some(frame) = self.stack.pop() {
            if frame.opener == Opener::Markdown {
                return Some(frame.id);
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Raw HTML
    // ------------------------------------------------------------------------

    /// Raw HTML is parsed with `tl`. Inline HTML arrives one tag at a time, so
    /// a lone start tag opens a frame that its end tag closes.
    fn add_raw_html(&mut self, html: &str) {
        let trimmed = html.trim();

        if let Some(name) = closing_tag_name(trimmed) {
            if let Some(Frame {
                opener: Opener::Html(open),
                ..
            }) = self.stack.last()
                && open.eq_ignore_ascii_case(name)
            {
                self.stack.pop();
            }
            return;
        }

        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            self.add_text(html);
            return;
        };
        let parser = dom.parser();
        let handles: Vec<tl::NodeHandle> = dom.children().to_vec();
        let lone_start_tag = handles.len() == 1 && is_start_tag(trimmed);

        for handle in handles {
            let Some(id) = self.convert_tl_node(handle, parser) else {
                continue;
            };
            self.add_node(id);

            if lone_start_tag
                && let Some(elem) = self.doc.element(id)
                && !is_void_element(&elem.name)
                && self.doc.children(id).is_empty()
            {
                let name = elem.name.clone();
                self.stack.push(Frame {
                    id,
                    opener: Opener::Html(name),
                });
            }
        }
    }

    fn convert_tl_node(&mut self, handle: tl::NodeHandle, parser: &tl::Parser) -> Option<NodeId> {
        match handle.get(parser)? {
            tl::Node::Tag(tag) => {
                let mut elem = Element::new(tag.name().as_utf8_str().to_lowercase());
                for (key, value) in tag.attributes().iter() {
                    let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                    elem.set_attr(key.into_owned(), value);
                }
                let id = self.doc.create_element(elem);
                let children: Vec<tl::NodeHandle> = tag.children().top().iter().copied().collect();
                for child in children {
                    if let Some(child) = self.convert_tl_node(child, parser) {
                        self.doc.append(id, child);
                    }
                }
                Some(id)
            }
            tl::Node::Raw(bytes) => {
                let text = bytes.as_utf8_str();
                if text.trim().is_empty() && text.contains('\n') {
                    return None;
                }
                Some(self.doc.create_text(unescape(&text).into_owned()))
            }
            tl::Node::Comment(_) => None,
        }
    }

    // ------------------------------------------------------------------------
    // Node helpers
    // ------------------------------------------------------------------------

    fn element<'k, const N: usize>(&mut self, name: &str, attrs: [(&'k str, &'k str); N]) -> NodeId {
        let mut elem = Element::new(name);
        for (key, value) in attrs {
            elem.set_attr(key, value);
        }
        self.doc.create_element(elem)
    }

    fn add_empty<const N: usize>(&mut self, name: &str, attrs: [(&str, &str); N]) {
        let id = self.element(name, attrs);
        self.add_node(id);
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let id = self.doc.create_text(text);
        self.add_node(id);
    }

    /// Attach a new node and make it the current parent.
    fn push(&mut self, id: NodeId) {
        self.add_node(id);
        self.stack.push(Frame {
            id,
            opener: Opener::Markdown,
        });
    }

    /// Attach to the current parent, or collect as a top-level node.
    fn add_node(&mut self, id: NodeId) {
        match self.stack.last() {
            Some(frame) => self.doc.append(frame.id, id),
            None => self.roots.push(id),
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// `</name>` -> `name`.
fn closing_tag_name(html: &str) -> Option<&str> {
    let name = html.strip_prefix("</")?.strip_suffix('>')?.trim();
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .then_some(name)
}

/// `<name ...>` that is neither a comment, a declaration nor self-closing.
fn is_start_tag(html: &str) -> bool {
    html.starts_with('<')
        && html.ends_with('>')
        && !html.ends_with("/>")
        && html[1..].starts_with(|c: char| c.is_ascii_alphabetic())
        && html.matches('<').count() == 1
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Render into a `<div>` and serialize its content as HTML.
    fn html(markdown: &str) -> String {
        let mut doc = Document::parse("<svg><foreignObject><div/></foreignObject></svg>").unwrap();
        let div = doc.find_all(doc.root(), "div")[0];
        for id in render(&mut doc, markdown) {
            doc.append(div, id);
        }
        let out = doc.to_string();
        out["<svg><foreignObject><div>".len()..out.len() - "</div></foreignObject></svg>".len()]
            .to_string()
    }

    #[test]
    fn test_paragraph_and_inline() {
        assert_eq!(
            html("Hello *big* **world** `x`"),
            "<p>Hello <em>big</em> <strong>world</strong> <code>x</code></p>"
        );
    }

    #[test]
    fn test_math() {
        assert_eq!(
            html("area $\\pi r^2$"),
            r#"<p>area <span class="math inline">\(\pi r^2\)</span></p>"#
        );
        assert_eq!(
            html("$$x$$"),
            r#"<p><span class="math display">\[x\]</span></p>"#
        );
    }

    #[test]
    fn test_escaping_and_breaks() {
        assert_eq!(html("a < b\nc"), "<p>a &lt; b\nc</p>");
        assert_eq!(html("a  \nb"), "<p>a<br/>b</p>");
    }

    #[test]
    fn test_inline_html_pairs() {
        assert_eq!(
            html("x <b class=\"k\">bold</b> y"),
            r#"<p>x <b class="k">bold</b> y</p>"#
        );
        assert_eq!(html("a<br>b"), "<p>a<br/>b</p>");
    }

    #[test]
    fn test_list_and_code_block() {
        assert_eq!(
            html("- one\n- two"),
            "<ul><li>one</li><li>two</li></ul>"
        );
        assert_eq!(
            html("```rust\nfn\n```"),
            r#"<pre><code class="language-rust">fn
</code></pre>"#
        );
    }

    #[test]
    fn test_table_header_cells() {
        assert_eq!(
            html("| a | b |\n|:--|---|\n| 1 | 2 |"),
            concat!(
                r#"<table><thead><tr><th style="text-align: left">a</th><th>b</th></tr></thead>"#,
                r#"<tr><td style="text-align: left">1</td><td>2</td></tr></table>"#
            )
        );
    }

    #[test]
    fn test_image_alt() {
        assert_eq!(
            html("![a *b*](x.png)"),
            r#"<p><img src="x.png" alt="a b"/></p>"#
        );
    }

    #[test]
    fn test_closing_tag_name() {
        assert_eq!(closing_tag_name("</span>"), Some("span"));
        assert_eq!(closing_tag_name("<span>"), None);
        assert!(is_start_tag("<span class=\"a\">"));
        assert!(!is_start_tag("<br/>"));
        assert!(!is_start_tag("<!-- c -->"));
    }
}
