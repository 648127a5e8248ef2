//! Weekly digest run
//!
//! Ingest the feed, load recipients, then select, render and deliver one email each.

use std::path::Path;

use chrono::{Datelike, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::db::{Database, DbError};
use crate::email::{
    manage_url, render_weekly_html, render_weekly_text, subject_line, Delivery, EmailMessage,
    MailError, Mailer, WeeklyEmail,
};
use crate::ingest::{ingest_deals, IngestError};
use crate::models::{Deal, DealRecord, Retailer};
use crate::selection::filter_and_top;
use crate::users::{load_users, User, UserError};

#[derive(Debug, Error)]
pub enum WeeklyError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Users(#[from] UserError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Delivery to {to} failed: {source}")]
    Mail {
        to: String,
        #[source]
        source: MailError,
    },
}

/// Per-recipient outcome
#[derive(Debug, Clone, Serialize)]
pub struct Prepared {
    pub name: String,
    pub email: String,
    pub deal_count: usize,
    pub subject: String,
}

/// Build the message for one recipient from the full deal list.
/// Returns the message and how many deals it lists.
pub fn prepare_message(
    config: &Config,
    user: &User,
    all_deals: &[DealRecord],
    year: i32,
) -> Result<(EmailMessage, usize), MailError> {
    let top = filter_and_top(all_deals, &user.preferred_retailers, config.top_n);
    let link = manage_url(&config.manage_url, &user.email)?;

    let html = render_weekly_html(&WeeklyEmail {
        brand: &config.brand,
        user_name: &user.name,
        deals: &top,
        manage_url: &link,
        year,
    });
    let text = render_weekly_text(&config.brand.name, &user.name, &top, &link);

    let message = EmailMessage {
        from: config.from_header(),
        to: user.email.clone(),
        subject: subject_line(&config.brand.name, top.len()),
        html,
        text,
    };
    Ok((message, top.len()))
}

/// Send every user their digest from deals already in the database
pub fn send_all(
    config: &Config,
    database: &Database,
    users: &[User],
    mailer: &dyn Mailer,
) -> Result<Vec<Prepared>, WeeklyError> {
    let all_deals = database.with_conn(DealRecord::fetch_all)?;
    let year = Local::now().year();

    let mut prepared = Vec::with_capacity(users.len());
    for user in users {
        let mail_err = |source: MailError| WeeklyError::Mail {
            to: user.email.clone(),
            source,
        };
        let (message, deal_count) = prepare_message(config, user, &all_deals, year).map_err(mail_err)?;
        let delivery = mailer.send(&message).map_err(mail_err)?;

        if let Delivery::Sent { id } = &delivery {
            info!("Sent to {} via {} (id {:?})", user.email, mailer.name(), id);
        }
        info!("Prepared email for {} <{}> ({} deals)", user.name, user.email, deal_count);

        prepared.push(Prepared {
            name: user.name.clone(),
            email: user.email.clone(),
            deal_count,
            subject: message.subject,
        });
    }

    Ok(prepared)
}

/// Full weekly run: ingest `deals_path`, then email every user in the configured users file
pub fn run_weekly(
    config: &Config,
    database: &Database,
    deals_path: &Path,
    mailer: &dyn Mailer,
) -> Result<Vec<Prepared>, WeeklyError> {
    ingest_deals(database, deals_path)?;
    let (deal_rows, retailers) =
        database.with_conn(|conn| Ok((Deal::count(conn)?, Retailer::list(conn)?)))?;
    let names: Vec<&str> = retailers.iter().map(|r| r.name.as_str()).collect();
    info!("Ingestion OK. {} deals on file from {}", deal_rows, names.join(", "));

    let users = load_users(&config.users_json)?;
    send_all(config, database, &users, mailer)
}
