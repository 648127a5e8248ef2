//! Scrape a saved retailer page into the deals JSON feed
//! Usage: cargo run --bin scrape_deals -- [source.html] [out.json]

use std::path::PathBuf;

use dealmail::scrape::{scrape_file, write_deals_json, DEFAULT_SOURCE};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dealmail=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let source = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(DEFAULT_SOURCE));
    let out = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("data/deals.scraped.json"));

    let deals = scrape_file(&source)?;
    write_deals_json(&out, &deals)?;
    println!("Scraped {} deals -> {}", deals.len(), out.display());

    Ok(())
}
