//! Shared formatting helpers for email bodies and the preview site

use chrono::NaiveDate;

use crate::models::DealRecord;

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// "Sep 1" style short date
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// "Sep 1–Sep 7"; `separator` goes between the two dates
pub fn date_range(start: NaiveDate, end: NaiveDate, separator: &str) -> String {
    format!("{}{}{}", short_date(start), separator, short_date(end))
}

/// "$3.49"
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Group deals by retailer, keeping the order in which retailers first appear
pub fn group_by_retailer(deals: &[DealRecord]) -> Vec<(&str, Vec<&DealRecord>)> {
    let mut groups: Vec<(&str, Vec<&DealRecord>)> = Vec::new();
    for deal in deals {
        match groups.iter_mut().find(|(name, _)| *name == deal.retailer) {
            Some((_, items)) => items.push(deal),
            None => groups.push((deal.retailer.as_str(), vec![deal])),
        }
    }
    groups
}
