//! Retailer model

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A store chain deals are offered at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retailer {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

impl Retailer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Find a retailer by exact name
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let retailer = conn
            .query_row(
                "SELECT * FROM retailers WHERE name = ?1",
                [name],
                Self::from_row,
            )
            .optional()?;
        Ok(retailer)
    }

    /// Find a retailer by name or insert it, returning its ID
    pub fn ensure(conn: &Connection, name: &str) -> DbResult<i64> {
        if let Some(existing) = Self::get_by_name(conn, name)? {
            return Ok(existing.id);
        }

        conn.execute("INSERT INTO retailers (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// List all retailers by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM retailers ORDER BY name ASC")?;
        let retailers = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(retailers)
    }
}
