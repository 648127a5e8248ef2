//! Weekly deals digest
//!
//! Ingests the deals feed and sends (or previews) one digest per recipient.
//! Usage: dealmail [--file=<deals.json>]

use dealmail::build_info;
use dealmail::config::{resolve_input_path, Config};
use dealmail::db::{migrations, Database};
use dealmail::email::mailer_from_config;
use dealmail::weekly::run_weekly;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dealmail=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner("Weekly Deals");

    let config = Config::from_env()?;
    info!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        let version = migrations::get_schema_version(conn)?;
        info!("Database schema version: {}", version);
        Ok(())
    })?;

    let deals_path = resolve_input_path(None, std::env::args().skip(1), config.deals_json.as_deref());
    let mailer = mailer_from_config(&config)?;
    info!("Delivering via {}", mailer.name());

    let prepared = run_weekly(&config, &database, &deals_path, mailer.as_ref())?;
    info!("All done. {} emails prepared.", prepared.len());

    Ok(())
}
