//! Product model
//!
//! A product is identified by its name, raw size text and category together.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub size: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
}

impl Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            size: row.get("size")?,
            category: row.get("category")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Find a product by (name, size, category); NULL matches NULL
    pub fn find(
        conn: &Connection,
        name: &str,
        size: Option<&str>,
        category: Option<&str>,
    ) -> DbResult<Option<Self>> {
        let product = conn
            .query_row(
                "SELECT * FROM products WHERE name = ?1 AND size IS ?2 AND category IS ?3",
                params![name, size, category],
                Self::from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// Find a product or insert it, returning its ID
    pub fn ensure(
        conn: &Connection,
        name: &str,
        size: Option<&str>,
        category: Option<&str>,
    ) -> DbResult<i64> {
        if let Some(existing) = Self::find(conn, name, size, category)? {
            return Ok(existing.id);
        }

        conn.execute(
            "INSERT INTO products (name, size, category) VALUES (?1, ?2, ?3)",
            params![name, size, category],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
