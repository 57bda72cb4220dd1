//! Length values with units.
//!
//! Parses `<number><unit>` strings (`210mm`, `12.5em`, `300`) and classifies
//! the unit as absolute (convertible to px) or relative (resolved by the
//! browser, never converted here).
//!
//! # Conversion factors
//!
//! | Unit | px       |
//! |------|----------|
//! | px   | 1        |
//! | cm   | 37.8     |
//! | mm   | 3.78     |
//! | in   | 96       |
//! | pt   | 96 / 72  |
//! | pc   | 16       |
//! | Q    | 37.8 / 40|

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Root font size used when expressing absolute lengths in `em`.
pub const ROOT_FONT_PX: f64 = 16.0;

static DIMENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)([a-zA-Z%]*)$").unwrap());

// ============================================================================
// Units
// ============================================================================

/// Absolute units, with a fixed pixel factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsoluteUnit {
    /// Bare number (user units, treated as px).
    None,
    Px,
    Cm,
    Mm,
    In,
    Pt,
    Pc,
    Q,
}

impl AbsoluteUnit {
    pub fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "" => Self::None,
            "px" => Self::Px,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "in" => Self::In,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "Q" => Self::Q,
            _ => return None,
        })
    }

    /// Pixels per unit.
    pub fn px_factor(self) -> f64 {
        match self {
            Self::None | Self::Px => 1.0,
            Self::Cm => 37.8,
            Self::Mm => 3.78,
            Self::In => 96.0,
            Self::Pt => 96.0 / 72.0,
            Self::Pc => 16.0,
            Self::Q => 37.8 / 40.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Px => "px",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::Q => "Q",
        }
    }
}

/// Units resolved by the rendering context (font size or viewport).
const RELATIVE_UNITS: &[&str] = &[
    "em", "ex", "ch", "rem", "lh", "rlh", "vw", "vh", "vmin", "vmax", "vb", "vi", "svw", "svh",
    "lvw", "lvh", "dvw", "dvh",
];

/// Unit of a parsed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Absolute(AbsoluteUnit),
    /// Relative unit, kept as its suffix.
    Relative(&'static str),
}

impl Unit {
    fn from_suffix(s: &str) -> Option<Self> {
        if let Some(abs) = AbsoluteUnit::from_suffix(s) {
            return Some(Self::Absolute(abs));
        }
        RELATIVE_UNITS
            .iter()
            .copied()
            .find(|u| *u == s)
            .map(Self::Relative)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Absolute(abs) => abs.suffix(),
            Self::Relative(s) => s,
        }
    }

    #[inline]
    pub fn is_relative(self) -> bool {
        matches!(self, Self::Relative(_))
    }
}

// ============================================================================
// Dimension
// ============================================================================

/// A validated length value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    /// Parse a source dimension (`width`/`height` attribute of the root).
    ///
    /// Returns `None` for malformed input and for unrecognized units
    /// (including `%`).
    pub fn parse(text: &str) -> Option<Self> {
        let (value, suffix) = split_number(text)?;
        let unit = Unit::from_suffix(suffix)?;
        Some(Self { value, unit })
    }

    /// Value in pixels. `None` for relative units.
    pub fn to_px(&self) -> Option<f64> {
        match self.unit {
            Unit::Absolute(abs) => Some(self.value * abs.px_factor()),
            Unit::Relative(_) => None,
        }
    }

    #[inline]
    pub fn is_relative(&self) -> bool {
        self.unit.is_relative()
    }

    /// Same unit, value multiplied by `factor` and rounded.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            value: round(self.value * factor),
            unit: self.unit,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit.suffix())
    }
}

// ============================================================================
// Target dimensions
// ============================================================================

/// Unit accepted for user-requested target sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetUnit {
    Px,
    Cm,
    Mm,
    In,
    Percent,
}

impl TargetUnit {
    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "px" => Self::Px,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "in" | "inch" => Self::In,
            "%" => Self::Percent,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
            Self::Percent => "%",
        }
    }
}

/// A user-requested width or height (`width=10cm` on the image reference).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDimension {
    pub value: f64,
    pub unit: TargetUnit,
}

impl TargetDimension {
    /// Parse a requested size; `inch` normalizes to `in`.
    pub fn parse(text: &str) -> Option<Self> {
        let (value, suffix) = split_number(text)?;
        let unit = TargetUnit::from_suffix(suffix)?;
        Some(Self { value, unit })
    }

    pub fn with_value(self, value: f64) -> Self {
        Self {
            value: round(value),
            unit: self.unit,
        }
    }
}

impl fmt::Display for TargetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit.suffix())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Split `12.5mm` into `(12.5, "mm")`.
fn split_number(text: &str) -> Option<(f64, &str)> {
    let caps = DIMENSION_RE.captures(text)?;
    let value = caps.get(1)?.as_str().parse().ok()?;
    let suffix = caps.get(2).map_or("", |m| m.as_str());
    Some((value, suffix))
}

/// Keep 10 significant digits, dropping floating-point noise.
///
/// `0.999999999999997` becomes `1`, `793.8000000000001` becomes `793.8`.
pub fn round(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    format!("{x:.9e}").parse().unwrap_or(x)
}

/// Shortest decimal form: `1`, `0.5`, `49.6125` (no exponent, no `-0`).
pub fn format_number(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    format!("{x}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute() {
        let d = Dimension::parse("210mm").unwrap();
        assert_eq!(d.value, 210.0);
        assert_eq!(d.unit, Unit::Absolute(AbsoluteUnit::Mm));

        let d = Dimension::parse("300").unwrap();
        assert_eq!(d.unit, Unit::Absolute(AbsoluteUnit::None));
        assert_eq!(d.to_px(), Some(300.0));

        assert_eq!(Dimension::parse("1in").unwrap().to_px(), Some(96.0));
        assert_eq!(Dimension::parse("2pc").unwrap().to_px(), Some(32.0));
    }

    #[test]
    fn test_ascii_digits_only() {
        assert_eq!(Dimension::parse("0123.50px").unwrap().value, 123.5);
        assert!(Dimension::parse("\u{0661}\u{0662}px").is_none());
    }

    #[test]
    fn test_parse_relative() {
        let d = Dimension::parse("1.5em").unwrap();
        assert!(d.is_relative());
        assert_eq!(d.to_px(), None);
        assert!(Dimension::parse("100vmin").unwrap().is_relative());
        assert!(Dimension::parse("3dvh").unwrap().is_relative());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Dimension::parse("50%"), None);
        assert_eq!(Dimension::parse("10furlong"), None);
        assert_eq!(Dimension::parse("-10px"), None);
        assert_eq!(Dimension::parse(".5px"), None);
        assert_eq!(Dimension::parse("10 px"), None);
        assert_eq!(Dimension::parse(""), None);
        // Units are case sensitive
        assert_eq!(Dimension::parse("10PX"), None);
        assert_eq!(Dimension::parse("10q"), None);
    }

    #[test]
    fn test_target_units() {
        let t = TargetDimension::parse("4inch").unwrap();
        assert_eq!(t.unit, TargetUnit::In);
        assert_eq!(t.to_string(), "4in");

        assert_eq!(TargetDimension::parse("50%").unwrap().to_string(), "50%");
        assert_eq!(TargetDimension::parse("10em"), None);
        assert_eq!(TargetDimension::parse("10pt"), None);
        assert_eq!(TargetDimension::parse("10"), None);
    }

    #[test]
    fn test_round() {
        assert_eq!(round(0.999999999999997), 1.0);
        assert_eq!(round(210.0 * 3.78), 793.8);
        assert_eq!(round(297.0 * 3.78 / 16.0), 70.16625);
        assert_eq!(round(0.0), 0.0);
        assert_eq!(round(-2.5), -2.5);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(49.6125), "49.6125");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-1.5), "-1.5");
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimension::parse("12.50cm").unwrap().to_string(), "12.5cm");
        assert_eq!(
            Dimension::parse("3em").unwrap().scaled(0.5).to_string(),
            "1.5em"
        );
    }
}
