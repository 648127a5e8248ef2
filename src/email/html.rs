//! HTML digest body
//!
//! Email-client-safe markup: nested tables and inline styles only.

use crate::models::DealRecord;
use crate::pricing::price_per_unit;

use super::format::{date_range, escape_html, format_price, group_by_retailer};
use super::Brand;

/// Column widths and cell paddings for a retailer's deal table
pub(crate) struct TableLayout {
    /// Percent widths: product, size + unit price, price, dates
    pub widths: [u8; 4],
    pub price_padding: &'static str,
    pub date_padding: &'static str,
}

pub(crate) const EMAIL_LAYOUT: TableLayout = TableLayout {
    widths: [54, 19, 12, 15],
    price_padding: "8px 8px 8px 0",
    date_padding: "8px 0 8px 8px",
};

/// Everything needed to render one recipient's email
#[derive(Debug, Clone)]
pub struct WeeklyEmail<'a> {
    pub brand: &'a Brand,
    pub user_name: &'a str,
    pub deals: &'a [DealRecord],
    pub manage_url: &'a str,
    /// Copyright year in the footer
    pub year: i32,
}

/// One table row: product, size with per-unit price, price, date range
fn deal_row(deal: &DealRecord, layout: &TableLayout) -> String {
    let ppu = price_per_unit(deal.price, deal.size.as_deref());
    let unit_price = ppu
        .label
        .map(|label| {
            format!(
                r#"<div style="font-size:12px;color:#777;margin-top:2px;">{}</div>"#,
                escape_html(&label)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<tr>
            <td style="padding:8px 0 4px 0;font-weight:600;vertical-align:top;">{product}</td>
            <td style="padding:8px 0;color:#555;vertical-align:top;">
              {size}
              {unit_price}
            </td>
            <td style="padding:{price_padding};font-weight:700;text-align:right;font-variant-numeric:tabular-nums;white-space:nowrap;">{price}</td>
            <td style="padding:{date_padding};color:#555;text-align:right;white-space:nowrap;">{dates}</td>
          </tr>"#,
        product = escape_html(&deal.product),
        size = escape_html(deal.size.as_deref().unwrap_or("")),
        unit_price = unit_price,
        price_padding = layout.price_padding,
        price = format_price(deal.price),
        date_padding = layout.date_padding,
        dates = date_range(deal.start_date, deal.end_date, " – "),
    )
}

/// Fixed-layout table of deals so columns line up across retailer sections
pub(crate) fn deal_table(items: &[&DealRecord], layout: &TableLayout) -> String {
    let rows: String = items.iter().map(|d| deal_row(d, layout)).collect();
    let [product, size, price, dates] = layout.widths;

    format!(
        r#"
        <table width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;table-layout:fixed;">
          <colgroup>
            <col style="width:{product}%">
            <col style="width:{size}%">
            <col style="width:{price}%">
            <col style="width:{dates}%">
          </colgroup>
          {rows}
        </table>"#
    )
}

/// Render the HTML weekly email
pub fn render_weekly_html(email: &WeeklyEmail<'_>) -> String {
    let brand = email.brand;
    let brand_name = escape_html(&brand.name);

    let sections: String = group_by_retailer(email.deals)
        .into_iter()
        .map(|(retailer, items)| {
            format!(
                r#"<tr><td style="padding:16px 0;">
        <div style="font-size:16px;font-weight:800;color:{dark};margin-bottom:8px;">{retailer}</div>
        {table}
      </td></tr>"#,
                dark = brand.dark,
                retailer = escape_html(retailer),
                table = deal_table(&items, &EMAIL_LAYOUT),
            )
        })
        .collect();

    let sections = if sections.is_empty() {
        "<tr><td>No matching deals this week.</td></tr>".to_string()
    } else {
        sections
    };

    format!(
        r#"<!doctype html>
<html>
  <body style="margin:0;padding:0;background:{bg};font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;color:#111;">
    <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background:{bg};padding:24px 0;">
      <tr>
        <td>
          <table role="presentation" width="600" align="center" cellpadding="0" cellspacing="0" style="background:#fff;border-radius:12px;overflow:hidden">
            <tr>
              <td style="background:{primary};color:#fff;padding:20px 24px;font-weight:800;font-size:20px;">
                {brand_name} Weekly Deals
              </td>
            </tr>
            <tr>
              <td style="padding:20px 24px;">
                <p style="margin:0 0 12px 0;">Hi {user_name},</p>
                <p style="margin:0 0 16px 0;">Here are your top deals this week (based on your preferred retailers).</p>
                <table width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse">
                  {sections}
                </table>
                <div style="margin-top:24px;font-size:12px;color:#666;">
                  <a href="{manage_url}" style="color:{primary};text-decoration:none;">Manage preferences</a> •
                  You’re receiving this because you subscribed to {brand_name} Weekly Deals.
                </div>
              </td>
            </tr>
            <tr>
              <td style="padding:16px 24px;background:#fafafa;font-size:12px;color:#666;">
                © {year} {brand_name}
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>
  </body>
</html>"#,
        bg = brand.bg,
        primary = brand.primary,
        brand_name = brand_name,
        user_name = escape_html(email.user_name),
        sections = sections,
        manage_url = escape_html(email.manage_url),
        year = email.year,
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn deal(retailer: &str, product: &str, size: Option<&str>, price: f64) -> DealRecord {
        DealRecord {
            retailer: retailer.to_string(),
            product: product.to_string(),
            size: size.map(str::to_string),
            category: None,
            price,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 9, 7).unwrap(),
        }
    }

    fn render(deals: &[DealRecord]) -> String {
        let brand = Brand::default();
        render_weekly_html(&WeeklyEmail {
            brand: &brand,
            user_name: "Ava <admin>",
            deals,
            manage_url: "https://example.com/preferences?email=ava%40example.com",
            year: 2025,
        })
    }

    #[test]
    fn test_rows_carry_unit_price_labels() {
        let html = render(&[
            deal("Sprouts", "Paper Towels", Some("12 rolls"), 3.49),
            deal("Sprouts", "Mystery Box", Some("family size"), 9.0),
        ]);
        assert!(html.contains("$0.29/ea"));
        assert!(html.contains("$3.49"));
        assert!(html.contains("Sep 1 – Sep 7"));
        assert!(html.contains("family size"));
        // Only the parseable size gets a unit price line
        assert_eq!(html.matches("margin-top:2px").count(), 1);
    }

    #[test]
    fn test_sections_grouped_by_retailer() {
        let html = render(&[
            deal("Sprouts", "A", None, 1.0),
            deal("Safeway", "B", None, 2.0),
            deal("Sprouts", "C", None, 3.0),
        ]);
        assert_eq!(html.matches("font-size:16px;font-weight:800").count(), 2);
        let sprouts = html.find(">Sprouts<").unwrap();
        let safeway = html.find(">Safeway<").unwrap();
        assert!(sprouts < safeway);
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render(&[deal("Trader Joe's", "Mac & Cheese", None, 2.0)]);
        assert!(html.contains("Hi Ava &lt;admin&gt;,"));
        assert!(html.contains("Trader Joe&#39;s"));
        assert!(html.contains("Mac &amp; Cheese"));
        assert!(html.contains("© 2025 Prox"));
    }

    #[test]
    fn test_empty_digest() {
        let html = render(&[]);
        assert!(html.contains("No matching deals this week."));
    }
}
