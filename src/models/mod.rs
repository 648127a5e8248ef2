//! Data models
//!
//! Rust structs representing database entities.

mod deal;
mod product;
mod retailer;

pub use deal::{Deal, DealInput, DealRecord, DealUpsert};
pub use product::Product;
pub use retailer::Retailer;
