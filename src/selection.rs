//! Per-user deal ranking

use crate::models::DealRecord;

/// Pick the cheapest `top_n` deals from a user's preferred retailers.
///
/// An empty preference list means every retailer. Retailer names match exactly. Deals
/// with equal prices keep their input order.
pub fn filter_and_top(deals: &[DealRecord], preferred_retailers: &[String], top_n: usize) -> Vec<DealRecord> {
    let mut selected: Vec<DealRecord> = deals
        .iter()
        .filter(|d| preferred_retailers.is_empty() || preferred_retailers.contains(&d.retailer))
        .cloned()
        .collect();

    selected.sort_by(|a, b| a.price.total_cmp(&b.price));
    selected.truncate(top_n);
    selected
}
