//! Deal ingestion
//!
//! Loads the JSON deal feed and upserts it into the database. Re-running with the same
//! feed leaves the database unchanged.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::db::{Database, DbError};
use crate::models::{Deal, DealInput, DealUpsert, Product, Retailer};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Could not read deals file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid deals JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upsert failed for {retailer} - {product}: {source}")]
    Upsert {
        retailer: String,
        product: String,
        #[source]
        source: DbError,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Outcome of an ingest run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub deals: usize,
    pub retailers: usize,
}

/// Read and parse a deals JSON file
pub fn load_deals(path: &Path) -> Result<Vec<DealInput>, IngestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Upsert already-parsed deals in a single transaction
pub fn ingest(database: &Database, deals: &[DealInput]) -> Result<IngestSummary, IngestError> {
    database.with_conn_mut(|conn| {
        let tx = conn.transaction().map_err(DbError::from)?;
        let mut retailers = HashSet::new();
        for deal in deals {
            upsert_one(&tx, deal).map_err(|source| IngestError::Upsert {
                retailer: deal.retailer.clone(),
                product: deal.product.clone(),
                source,
            })?;
            retailers.insert(deal.retailer.as_str());
        }
        tx.commit().map_err(DbError::from)?;

        Ok(IngestSummary {
            deals: deals.len(),
            retailers: retailers.len(),
        })
    })
}

fn upsert_one(conn: &rusqlite::Connection, deal: &DealInput) -> Result<i64, DbError> {
    let retailer_id = Retailer::ensure(conn, &deal.retailer)?;
    let product_id = Product::ensure(
        conn,
        &deal.product,
        deal.size.as_deref(),
        deal.category.as_deref(),
    )?;

    Deal::upsert(
        conn,
        &DealUpsert {
            retailer_id,
            product_id,
            price: deal.price,
            start_date: deal.start,
            end_date: deal.end,
        },
    )
}

/// Load a deals file and ingest it
pub fn ingest_deals(database: &Database, path: &Path) -> Result<IngestSummary, IngestError> {
    let deals = load_deals(path)?;
    let summary = ingest(database, &deals)?;
    info!(
        "Ingested {} deals ({} retailers) from {}",
        summary.deals,
        summary.retailers,
        path.display()
    );
    Ok(summary)
}
