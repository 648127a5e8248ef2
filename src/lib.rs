//! Weekly Deals Digest Library
//!
//! Ingests retail deals, normalizes package sizes into comparable per-unit prices, picks
//! each recipient's cheapest deals and renders them as an email.

pub mod build_info;
pub mod config;
pub mod db;
pub mod email;
pub mod ingest;
pub mod models;
pub mod preview;
pub mod pricing;
pub mod scrape;
pub mod selection;
pub mod users;
pub mod weekly;
