//! Per-unit price computation

use serde::Serialize;

use super::size::parse_size;

/// Price per canonical unit, with its display label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPrice {
    /// Price / normalized quantity, rounded to cents
    pub value: Option<f64>,
    /// e.g. "$0.29/ea", "$8.99/lb"
    pub label: Option<String>,
}

impl UnitPrice {
    /// No usable per-unit price; callers omit the annotation
    pub fn none() -> Self {
        Self {
            value: None,
            label: None,
        }
    }
}

/// Round to 2 decimal places, halves away from zero. Never returns negative zero.
fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Compute the per-unit price for a line item.
///
/// Returns [`UnitPrice::none`] when the size cannot be normalized. A normalized quantity of
/// zero also yields no price rather than a division by zero.
pub fn price_per_unit(price: f64, size_text: Option<&str>) -> UnitPrice {
    let parsed = parse_size(size_text);
    let Some(normalized) = parsed.normalized else {
        return UnitPrice::none();
    };
    if normalized.quantity == 0.0 {
        return UnitPrice::none();
    }

    let value = round_cents(price / normalized.quantity);
    let label = format!("${}/{}", value, normalized.unit.display_abbrev());

    UnitPrice {
        value: Some(value),
        label: Some(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_lb() {
        let ppu = price_per_unit(8.99, Some("per lb"));
        assert_eq!(ppu.value, Some(8.99));
        assert_eq!(ppu.label.as_deref(), Some("$8.99/lb"));
    }

    #[test]
    fn test_rolls_relabelled_each() {
        let ppu = price_per_unit(3.49, Some("12 rolls"));
        assert_eq!(ppu.value, Some(0.29));
        assert_eq!(ppu.label.as_deref(), Some("$0.29/ea"));
    }

    #[test]
    fn test_gallon_in_fluid_ounces() {
        let ppu = price_per_unit(5.00, Some("1 gallon"));
        assert_eq!(ppu.value, Some(0.04));
        assert_eq!(ppu.label.as_deref(), Some("$0.04/fl oz"));
    }

    #[test]
    fn test_each_and_ounces() {
        assert_eq!(price_per_unit(1.25, Some("each")).label.as_deref(), Some("$1.25/each"));
        assert_eq!(price_per_unit(3.00, Some("6 oz")).label.as_deref(), Some("$0.5/oz"));
    }

    #[test]
    fn test_label_uses_shortest_decimal() {
        assert_eq!(price_per_unit(5.0, Some("lb")).label.as_deref(), Some("$5/lb"));
        assert_eq!(price_per_unit(3.6, Some("12 rolls")).label.as_deref(), Some("$0.3/ea"));
    }

    #[test]
    fn test_unrecognized_size() {
        assert_eq!(price_per_unit(4.00, Some("mystery size")), UnitPrice::none());
    }

    #[test]
    fn test_missing_size() {
        assert_eq!(price_per_unit(4.00, None), UnitPrice::none());
        assert_eq!(price_per_unit(4.00, Some("")), UnitPrice::none());
    }

    #[test]
    fn test_zero_quantity_yields_no_price() {
        // "0 oz" parses to a real zero, distinct from a missing size, but no price is derived
        // from it: the result matches an unparseable size.
        assert_eq!(price_per_unit(2.00, Some("0 oz")), UnitPrice::none());
        assert_eq!(price_per_unit(2.00, Some("0 gal")), UnitPrice::none());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(2.0 / 3.0), 0.67);
        assert_eq!(round_cents(0.004), 0.0);
    }

    #[test]
    fn test_negative_price_rounding_to_zero() {
        let ppu = price_per_unit(-0.001, Some("lb"));
        assert_eq!(ppu.label.as_deref(), Some("$0/lb"));
        assert!(ppu.value.is_some_and(f64::is_sign_positive));

        assert_eq!(price_per_unit(-2.5, Some("lb")).label.as_deref(), Some("$-2.5/lb"));
    }
}
