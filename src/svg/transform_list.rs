//! `transform` attribute micro-parser.
//!
//! Splits `translate(-1 -2) scale(1 0.5)` into ordered function terms.
//! Terms are kept verbatim so that untouched ones round-trip exactly.

use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::LazyLock;

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+)[ \t\r\n]*\(([^()]*)\)").unwrap());

/// One function term, e.g. `rotate(45 10 10)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformTerm {
    /// Function name (`translate`, `scale`, `matrix`, ...).
    pub name: String,
    /// Raw argument text between the parentheses.
    pub args: String,
    /// The term exactly as written.
    text: String,
}

impl TransformTerm {
    /// Numeric arguments, split on whitespace and commas.
    pub fn numbers(&self) -> Option<SmallVec<[f64; 6]>> {
        self.args
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().ok())
            .collect()
    }

    /// `(dx, dy)` if this is a well-formed `translate` term.
    pub fn as_translate(&self) -> Option<(f64, f64)> {
        if self.name != "translate" {
            return None;
        }
        match self.numbers()?.as_slice() {
            [dx] => Some((*dx, 0.0)),
            [dx, dy] => Some((*dx, *dy)),
            _ => None,
        }
    }
}

/// Ordered list of transform terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformList {
    terms: SmallVec<[TransformTerm; 4]>,
}

impl TransformList {
    /// Parse a `transform` attribute value.
    ///
    /// Returns `None` if anything other than terms, whitespace and commas
    /// appears in the input.
    pub fn parse(text: &str) -> Option<Self> {
        let mut terms = SmallVec::new();
        let mut last = 0;
        for caps in TERM_RE.captures_iter(text) {
            let whole = caps.get(0)?;
            if !is_separator(&text[last..whole.start()]) {
                return None;
            }
            last = whole.end();
            terms.push(TransformTerm {
                name: caps[1].to_string(),
                args: caps[2].trim().to_string(),
                text: whole.as_str().to_string(),
            });
        }
        if !is_separator(&text[last..]) {
            return None;
        }
        Some(Self { terms })
    }

    pub fn terms(&self) -> &[TransformTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Index and offset of the first `translate` term.
    pub fn find_translate(&self) -> Option<(usize, (f64, f64))> {
        self.terms
            .iter()
            .enumerate()
            .find_map(|(i, term)| term.as_translate().map(|d| (i, d)))
    }

    pub fn remove(&mut self, index: usize) -> TransformTerm {
        self.terms.remove(index)
    }
}

impl fmt::Display for TransformList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&term.text)?;
        }
        Ok(())
    }
}

#[inline]
fn is_separator(s: &str) -> bool {
    s.chars().all(|c| c == ',' || c.is_whitespace())
}
