//! Build the static preview page from deals already in the database

use dealmail::config::Config;
use dealmail::db::{migrations, Database};
use dealmail::models::DealRecord;
use dealmail::preview::{build_site, render_site};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dealmail=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    println!("Database: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    let deals = database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        DealRecord::fetch_all(conn)
    })?;

    let html = render_site(&config.brand, &deals);
    let path = build_site(&config.site_dir, &html)?;
    println!("Built preview page at {} ({} deals)", path.display(), deals.len());

    Ok(())
}
