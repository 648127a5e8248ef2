//! Static preview page of every deal in the database

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::email::format::{escape_html, group_by_retailer};
use crate::email::html::{deal_table, TableLayout};
use crate::email::Brand;
use crate::models::DealRecord;

const SITE_LAYOUT: TableLayout = TableLayout {
    widths: [56, 17, 12, 15],
    price_padding: "8px 0",
    date_padding: "8px 0",
};

/// Render one card per retailer, each sorted by price
pub fn render_site(brand: &Brand, deals: &[DealRecord]) -> String {
    let brand_name = escape_html(&brand.name);

    let cards: String = group_by_retailer(deals)
        .into_iter()
        .map(|(retailer, mut items)| {
            items.sort_by(|a, b| a.price.total_cmp(&b.price));
            format!(
                r#"
        <div style="background:#fff;border:1px solid #eee;border-radius:12px;padding:16px;margin-bottom:16px;">
          <div style="font-weight:800;color:{dark};margin-bottom:8px;">{retailer}</div>
          {table}
        </div>"#,
                dark = brand.dark,
                retailer = escape_html(retailer),
                table = deal_table(&items, &SITE_LAYOUT),
            )
        })
        .collect();

    let cards = if cards.is_empty() {
        "<p>No deals.</p>".to_string()
    } else {
        cards
    };

    format!(
        r#"<!doctype html><html><head><meta charset="utf-8"><title>{brand_name} Deals</title></head>
  <body style="margin:0;background:{bg};font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;">
    <div style="max-width:900px;margin:24px auto;padding:0 16px;">
      <div style="background:{primary};color:#fff;border-radius:12px;padding:16px 20px;font-weight:800;font-size:20px;">
        {brand_name} Weekly Deals
      </div>
      <div style="margin-top:16px">{cards}</div>
    </div>
  </body></html>"#,
        brand_name = brand_name,
        bg = brand.bg,
        primary = brand.primary,
        cards = cards,
    )
}

/// Write `index.html` into `dir`, creating it if needed
pub fn build_site(dir: &Path, html: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("index.html");
    fs::write(&path, html)?;
    info!("Built preview page at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn deal(retailer: &str, product: &str, size: &str, price: f64) -> DealRecord {
        DealRecord {
            retailer: retailer.to_string(),
            product: product.to_string(),
            size: Some(size.to_string()),
            category: None,
            price,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 9, 7).unwrap(),
        }
    }

    #[test]
    fn test_cards_sorted_by_price_within_retailer() {
        let deals = vec![
            deal("Sprouts", "Salmon", "per lb", 8.99),
            deal("Safeway", "Milk", "1 gallon", 5.0),
            deal("Sprouts", "Towels", "12 rolls", 3.49),
        ];
        let html = render_site(&Brand::default(), &deals);

        let towels = html.find("Towels").unwrap();
        let salmon = html.find("Salmon").unwrap();
        assert!(towels < salmon);
        assert!(html.contains("$8.99/lb"));
        assert!(html.contains("$0.04/fl oz"));
        assert!(html.contains("<title>Prox Deals</title>"));
    }

    #[test]
    fn test_empty_site() {
        assert!(render_site(&Brand::default(), &[]).contains("<p>No deals.</p>"));
    }

    #[test]
    fn test_build_site_writes_index() {
        let mut dir = std::env::temp_dir();
        dir.push("dealmail_site_test");
        let _ = fs::remove_dir_all(&dir);

        let path = build_site(&dir, "<html></html>").unwrap();
        assert_eq!(path, dir.join("index.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
