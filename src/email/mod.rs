//! Weekly digest email
//!
//! Rendering (plain text and HTML) and delivery.

pub mod format;
pub mod html;
pub mod send;
pub mod text;

use serde::{Deserialize, Serialize};

pub use html::{render_weekly_html, WeeklyEmail};
pub use send::{
    mailer_from_config, manage_url, mime_message, safe_file_stem, Delivery, EmailMessage, MailError,
    Mailer, PreviewMailer, ResendMailer, SmtpMailer,
};
pub use text::render_weekly_text;

/// Brand name and colors used by every rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub primary: String,
    pub dark: String,
    pub bg: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            name: "Prox".to_string(),
            primary: "#0b8a5f".to_string(),
            dark: "#0a3d2e".to_string(),
            bg: "#f3f7f5".to_string(),
        }
    }
}

/// Subject line naming the brand and how many deals are included
pub fn subject_line(brand_name: &str, deal_count: usize) -> String {
    format!("{} Weekly Deals — Top {}", brand_name, deal_count)
}
