//! Size string parsing
//!
//! Turns free-text package sizes ("170 fl oz", "1 gal", "12 rolls", "per lb") into a
//! quantity in one of the canonical units.

use serde::Serialize;

use super::units::{CanonicalUnit, FL_OZ_PER_GALLON};

/// Quantity expressed in a canonical unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedSize {
    pub quantity: f64,
    pub unit: CanonicalUnit,
}

/// Result of parsing a size string
///
/// `normalized` carries quantity and unit together, so one is never present without the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSize {
    /// The number as written (e.g., 1.0 from "1 gallon")
    pub quantity: Option<f64>,
    /// The unit as written, lowercased (e.g., "gallon"); the whole text for unrecognized sizes
    pub unit: Option<String>,
    pub normalized: Option<NormalizedSize>,
}

impl ParsedSize {
    /// No size given at all
    pub fn empty() -> Self {
        Self {
            quantity: None,
            unit: None,
            normalized: None,
        }
    }

    /// Unrecognized format: keep the text for display, nothing usable for pricing
    pub fn unrecognized(text: &str) -> Self {
        Self {
            quantity: None,
            unit: Some(text.to_string()),
            normalized: None,
        }
    }

    fn recognized(quantity: f64, unit: &str, normalized_quantity: f64, normalized_unit: CanonicalUnit) -> Self {
        Self {
            quantity: Some(quantity),
            unit: Some(unit.to_string()),
            normalized: Some(NormalizedSize {
                quantity: normalized_quantity,
                unit: normalized_unit,
            }),
        }
    }

    pub fn normalized_quantity(&self) -> Option<f64> {
        self.normalized.map(|n| n.quantity)
    }

    pub fn normalized_unit(&self) -> Option<CanonicalUnit> {
        self.normalized.map(|n| n.unit)
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// What a matcher pulled out of the size text
#[derive(Debug, Clone, Copy)]
struct Matched<'a> {
    quantity: f64,
    word: &'a str,
}

/// One recognized size format: a matcher and the transform applied to its captures
struct SizeRule {
    name: &'static str,
    matcher: fn(&str) -> Option<Matched<'_>>,
    transform: fn(Matched<'_>) -> ParsedSize,
}

/// Recognized formats in priority order. First match wins.
const SIZE_RULES: &[SizeRule] = &[
    SizeRule {
        name: "per lb",
        matcher: match_per_pound,
        transform: |_| ParsedSize::recognized(1.0, "lb", 1.0, CanonicalUnit::Lb),
    },
    SizeRule {
        name: "each",
        matcher: match_each,
        transform: |_| ParsedSize::recognized(1.0, "each", 1.0, CanonicalUnit::Each),
    },
    SizeRule {
        name: "rolls",
        matcher: match_rolls,
        transform: |m| ParsedSize::recognized(m.quantity, "rolls", m.quantity, CanonicalUnit::Count),
    },
    SizeRule {
        name: "fl oz",
        matcher: match_fluid_ounces,
        transform: |m| ParsedSize::recognized(m.quantity, "fl oz", m.quantity, CanonicalUnit::FlOz),
    },
    SizeRule {
        name: "gallon",
        matcher: match_gallons,
        transform: |m| {
            ParsedSize::recognized(m.quantity, m.word, m.quantity * FL_OZ_PER_GALLON, CanonicalUnit::FlOz)
        },
    },
    SizeRule {
        name: "oz",
        matcher: match_ounces,
        transform: |m| ParsedSize::recognized(m.quantity, "oz", m.quantity, CanonicalUnit::Oz),
    },
];

fn match_per_pound(s: &str) -> Option<Matched<'_>> {
    matches!(s, "per lb" | "lb").then_some(Matched { quantity: 1.0, word: "lb" })
}

fn match_each(s: &str) -> Option<Matched<'_>> {
    (s == "each").then_some(Matched { quantity: 1.0, word: "each" })
}

/// "12 rolls", "1 roll" - at least one space before the word
fn match_rolls(s: &str) -> Option<Matched<'_>> {
    let (quantity, rest) = split_leading_number(s)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let word = rest.trim_start();
    matches!(word, "roll" | "rolls").then_some(Matched { quantity, word })
}

/// "170 fl oz", "64floz", "12 fl  oz"
fn match_fluid_ounces(s: &str) -> Option<Matched<'_>> {
    let (quantity, rest) = split_leading_number(s)?;
    let after_fl = rest.trim_start().strip_prefix("fl")?;
    (after_fl.trim_start() == "oz").then_some(Matched { quantity, word: "fl oz" })
}

/// "1 gallon", "2 gal", "0.5gal"
fn match_gallons(s: &str) -> Option<Matched<'_>> {
    let (quantity, rest) = split_leading_number(s)?;
    let word = rest.trim_start();
    matches!(word, "gallon" | "gal").then_some(Matched { quantity, word })
}

/// "6 oz", "6oz"
fn match_ounces(s: &str) -> Option<Matched<'_>> {
    let (quantity, rest) = split_leading_number(s)?;
    (rest.trim_start() == "oz").then_some(Matched { quantity, word: "oz" })
}

/// Split a leading unsigned decimal ("12", "1.5") off the front of `s`.
///
/// A trailing dot with no digits after it is not part of the number.
fn split_leading_number(s: &str) -> Option<(f64, &str)> {
    let bytes = s.as_bytes();
    let int_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if int_len == 0 {
        return None;
    }

    let mut end = int_len;
    if bytes.get(end) == Some(&b'.') {
        let frac_len = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    let quantity = s[..end].parse::<f64>().ok()?;
    Some((quantity, &s[end..]))
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a raw size string.
///
/// Never fails: empty or missing input gives [`ParsedSize::empty`], anything unrecognized
/// gives [`ParsedSize::unrecognized`] with the lowercased text.
///
/// Examples:
/// - "per lb" -> 1 lb
/// - "12 Rolls" -> 12 count (unit "rolls")
/// - "1 gallon" -> 128 fl oz (unit "gallon")
/// - "family size" -> unrecognized, unit "family size"
pub fn parse_size(size_text: Option<&str>) -> ParsedSize {
    let text = match size_text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return ParsedSize::empty(),
    };

    for rule in SIZE_RULES {
        if let Some(matched) = (rule.matcher)(&text) {
            return (rule.transform)(matched);
        }
    }

    tracing::debug!("Unrecognized size format '{}', no normalization applied", text);
    ParsedSize::unrecognized(&text)
}

/// Names of the recognized formats, in the order they are tried
pub fn recognized_formats() -> impl Iterator<Item = &'static str> {
    SIZE_RULES.iter().map(|rule| rule.name)
}
