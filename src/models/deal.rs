//! Deal model
//!
//! A time-boxed price for one product at one retailer.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A deal as it appears in the JSON feed (and in scraper output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealInput {
    pub retailer: String,
    pub product: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
}

/// Data for inserting or refreshing a deal row
#[derive(Debug, Clone)]
pub struct DealUpsert {
    pub retailer_id: i64,
    pub product_id: i64,
    pub price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Deal operations on the `deals` table
pub struct Deal;

impl Deal {
    /// Insert a deal, or update price and end date when the
    /// (retailer, product, start date) triple already exists. Returns the row ID.
    pub fn upsert(conn: &Connection, data: &DealUpsert) -> DbResult<i64> {
        let id = conn.query_row(
            r#"
            INSERT INTO deals (retailer_id, product_id, price, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(retailer_id, product_id, start_date) DO UPDATE SET
                price = excluded.price,
                end_date = excluded.end_date,
                updated_at = datetime('now')
            RETURNING id
            "#,
            params![
                data.retailer_id,
                data.product_id,
                data.price,
                data.start_date,
                data.end_date,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Count deal rows
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM deals", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// A deal joined with its retailer and product, ready for ranking and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub retailer: String,
    pub product: String,
    pub size: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DealRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            retailer: row.get("retailer")?,
            product: row.get("product")?,
            size: row.get("size")?,
            category: row.get("category")?,
            price: row.get("price")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
        })
    }

    /// Fetch every deal with retailer and product details, in insertion order
    pub fn fetch_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.name AS retailer, p.name AS product, p.size, p.category,
                   d.price, d.start_date, d.end_date
            FROM deals d
            INNER JOIN retailers r ON r.id = d.retailer_id
            INNER JOIN products p ON p.id = d.product_id
            ORDER BY d.id ASC
            "#,
        )?;

        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations::run_migrations, Database};
    use crate::models::{Product, Retailer};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_deal_input_optional_fields() {
        let json = r#"{"retailer":"Sprouts","product":"Bananas","price":0.59,
                       "start":"2025-09-01","end":"2025-09-07"}"#;
        let input: DealInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.size, None);
        assert_eq!(input.category, None);
        assert_eq!(input.start, date("2025-09-01"));
    }

    #[test]
    fn test_upsert_updates_on_conflict() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            let retailer_id = Retailer::ensure(conn, "Sprouts")?;
            let product_id = Product::ensure(conn, "Salmon Fillet", Some("per lb"), Some("protein"))?;

            let mut data = DealUpsert {
                retailer_id,
                product_id,
                price: 9.99,
                start_date: date("2025-09-01"),
                end_date: date("2025-09-07"),
            };
            let first = Deal::upsert(conn, &data)?;

            data.price = 8.99;
            data.end_date = date("2025-09-08");
            let second = Deal::upsert(conn, &data)?;

            assert_eq!(first, second);
            assert_eq!(Deal::count(conn)?, 1);

            let records = DealRecord::fetch_all(conn)?;
            assert_eq!(
                records,
                vec![DealRecord {
                    retailer: "Sprouts".to_string(),
                    product: "Salmon Fillet".to_string(),
                    size: Some("per lb".to_string()),
                    category: Some("protein".to_string()),
                    price: 8.99,
                    start_date: date("2025-09-01"),
                    end_date: date("2025-09-08"),
                }]
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_new_start_date_is_a_new_deal() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            let retailer_id = Retailer::ensure(conn, "Sprouts")?;
            let product_id = Product::ensure(conn, "Eggs", Some("each"), None)?;
            for start in ["2025-09-01", "2025-09-08"] {
                Deal::upsert(
                    conn,
                    &DealUpsert {
                        retailer_id,
                        product_id,
                        price: 0.5,
                        start_date: date(start),
                        end_date: date(start),
                    },
                )?;
            }
            assert_eq!(Deal::count(conn)?, 2);
            Ok(())
        })
        .unwrap();
    }
}
