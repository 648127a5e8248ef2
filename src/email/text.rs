//! Plain-text digest body

use crate::models::DealRecord;

use super::format::{date_range, format_price};

/// Render the plain-text alternative of the weekly email
pub fn render_weekly_text(brand_name: &str, user_name: &str, deals: &[DealRecord], manage_url: &str) -> String {
    if deals.is_empty() {
        return format!("{brand_name} Weekly Deals\n\nHi {user_name},\nNo matching deals this week.\n");
    }

    let lines: Vec<String> = deals
        .iter()
        .map(|d| {
            format!(
                "• {}: {} ({}) - {} [{}]",
                d.retailer,
                d.product,
                d.size.as_deref().unwrap_or(""),
                format_price(d.price),
                date_range(d.start_date, d.end_date, "–"),
            )
        })
        .collect();

    format!(
        "{brand_name} Weekly Deals\n\nHi {user_name},\nHere are your top deals this week:\n\n{}\n\nManage preferences: {manage_url}",
        lines.join("\n")
    )
}
