//! Canonical units and conversion constants
//!
//! Every recognized size collapses into one of a small closed set of units so that prices
//! for differently-sized packages can be compared.

use serde::{Deserialize, Serialize};

/// Fluid ounces per US gallon (exact)
pub const FL_OZ_PER_GALLON: f64 = 128.0;

/// Canonical unit a parsed size is normalized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalUnit {
    #[serde(rename = "oz")]
    Oz,
    #[serde(rename = "fl oz")]
    FlOz,
    #[serde(rename = "lb")]
    Lb,
    #[serde(rename = "each")]
    Each,
    #[serde(rename = "count")]
    Count,
}

impl CanonicalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalUnit::Oz => "oz",
            CanonicalUnit::FlOz => "fl oz",
            CanonicalUnit::Lb => "lb",
            CanonicalUnit::Each => "each",
            CanonicalUnit::Count => "count",
        }
    }

    /// Parse from the canonical string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "oz" => Some(CanonicalUnit::Oz),
            "fl oz" => Some(CanonicalUnit::FlOz),
            "lb" => Some(CanonicalUnit::Lb),
            "each" => Some(CanonicalUnit::Each),
            "count" => Some(CanonicalUnit::Count),
            _ => None,
        }
    }

    /// Abbreviation shown after the slash in a per-unit label
    pub fn display_abbrev(&self) -> &'static str {
        match self {
            CanonicalUnit::Count => "ea",
            other => other.as_str(),
        }
    }
}

/// Relabel a unit string for display.
///
/// Only `count` changes (to `ea`); since `ea` is not itself relabeled, applying this twice
/// gives the same result as applying it once.
pub fn display_unit(unit: &str) -> &str {
    match CanonicalUnit::from_str(unit) {
        Some(canonical) => canonical.display_abbrev(),
        None => unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_round_trip_strings() {
        for unit in [
            CanonicalUnit::Oz,
            CanonicalUnit::FlOz,
            CanonicalUnit::Lb,
            CanonicalUnit::Each,
            CanonicalUnit::Count,
        ] {
            assert_eq!(CanonicalUnit::from_str(unit.as_str()), Some(unit));
        }
        assert_eq!(CanonicalUnit::from_str("ea"), None);
        assert_eq!(CanonicalUnit::from_str("gal"), None);
    }

    #[test]
    fn test_display_abbrev() {
        assert_eq!(CanonicalUnit::Count.display_abbrev(), "ea");
        assert_eq!(CanonicalUnit::FlOz.display_abbrev(), "fl oz");
        assert_eq!(CanonicalUnit::Each.display_abbrev(), "each");
    }

    #[test]
    fn test_display_unit_is_stable() {
        for unit in ["count", "oz", "fl oz", "lb", "each", "rolls", "ea"] {
            let once = display_unit(unit);
            assert_eq!(display_unit(once), once, "relabel of {unit:?} cascaded");
        }
        assert_eq!(display_unit("count"), "ea");
        assert_eq!(display_unit("rolls"), "rolls");
    }

    #[test]
    fn test_serde_uses_canonical_strings() {
        let json = serde_json::to_string(&CanonicalUnit::FlOz).unwrap();
        assert_eq!(json, "\"fl oz\"");
    }
}
