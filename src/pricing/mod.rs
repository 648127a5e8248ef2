//! Pricing module
//!
//! Size parsing and per-unit price normalization.

pub mod size;
pub mod unit_price;
pub mod units;

pub use size::{parse_size, recognized_formats, NormalizedSize, ParsedSize};
pub use unit_price::{price_per_unit, UnitPrice};
pub use units::{display_unit, CanonicalUnit, FL_OZ_PER_GALLON};
