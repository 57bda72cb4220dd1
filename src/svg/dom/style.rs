//! Inline `style` declarations.
//!
//! An ordered property -> (value, priority) map. Serialization uses the
//! compact form minifiers emit: `fill:red;font-size:12px!important`.

use indexmap::IndexMap;
use std::fmt;

/// A single declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            important: false,
        }
    }
}

/// Parsed inline style of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    decls: IndexMap<String, Declaration>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value.
    ///
    /// Declarations without a `:` or with an empty property are skipped.
    /// A later declaration of the same property replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for chunk in split_declarations(text) {
            let Some((prop, value)) = chunk.split_once(':') else {
                continue;
            };
            let prop = prop.trim().to_ascii_lowercase();
            if prop.is_empty() {
                continue;
            }
            let (value, important) = strip_important(value.trim());
            style.decls.insert(
                prop,
                Declaration {
                    value: value.to_string(),
                    important,
                },
            );
        }
        style
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.decls.get(prop).map(|d| d.value.as_str())
    }

    pub fn declaration(&self, prop: &str) -> Option<&Declaration> {
        self.decls.get(prop)
    }

    pub fn contains(&self, prop: &str) -> bool {
        self.decls.contains_key(prop)
    }

    /// Set a normal-priority declaration, keeping its position if present.
    pub fn set(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        self.decls.insert(prop.into(), Declaration::new(value));
    }

    pub fn set_declaration(&mut self, prop: impl Into<String>, decl: Declaration) {
        self.decls.insert(prop.into(), decl);
    }

    pub fn remove(&mut self, prop: &str) -> Option<Declaration> {
        self.decls.shift_remove(prop)
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.decls.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only declarations for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Declaration) -> bool) {
        self.decls.retain(|k, v| keep(k, v));
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (prop, decl)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{prop}:{}", decl.value)?;
            if decl.important {
                f.write_str("!important")?;
            }
        }
        Ok(())
    }
}

/// Split on `;` outside of quotes and parentheses.
fn split_declarations(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// Split `red ! important` into `("red", true)`.
fn strip_important(value: &str) -> (&str, bool) {
    if let Some(bang) = value.rfind('!') {
        let tail = value[bang + 1..].trim();
        if tail.eq_ignore_ascii_case("important") {
            return (value[..bang].trim_end(), true);
        }
    }
    (value, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let style = Style::parse("fill: red; font-size:12px ;stroke:none");
        assert_eq!(style.len(), 3);
        assert_eq!(style.get("fill"), Some("red"));
        assert_eq!(style.get("font-size"), Some("12px"));
        assert_eq!(style.to_string(), "fill:red;font-size:12px;stroke:none");
    }

    #[test]
    fn test_important() {
        let style = Style::parse("fill:red !important;stroke:blue");
        let fill = style.declaration("fill").unwrap();
        assert_eq!(fill.value, "red");
        assert!(fill.important);
        assert!(!style.declaration("stroke").unwrap().important);
        assert_eq!(style.to_string(), "fill:red!important;stroke:blue");
    }

    #[test]
    fn test_quoted_semicolons() {
        let style = Style::parse("font-family:'A;B', serif;fill:url(#a;b)");
        assert_eq!(style.get("font-family"), Some("'A;B', serif"));
        assert_eq!(style.get("fill"), Some("url(#a;b)"));
    }

    #[test]
    fn test_garbage_skipped() {
        let style = Style::parse(";;nonsense; :x; Fill:Red");
        assert_eq!(style.len(), 1);
        assert_eq!(style.get("fill"), Some("Red"));
    }

    #[test]
    fn test_set_and_remove_keep_order() {
        let mut style = Style::parse("a:1;b:2;c:3");
        style.remove("b");
        style.set("a", "9");
        style.set("d", "4");
        assert_eq!(style.to_string(), "a:9;c:3;d:4");
    }
}
