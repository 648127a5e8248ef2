//! Runtime configuration
//!
//! Everything is read from environment variables with defaults suitable for a local dry run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::email::Brand;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

pub const DEFAULT_DEALS_JSON: &str = "data/deals.sample.json";
pub const DEFAULT_USERS_JSON: &str = "data/users.sample.json";
pub const DEFAULT_MANAGE_URL: &str = "https://example.com/preferences";
pub const DEFAULT_TOP_N: usize = 6;
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings, present when `SMTP_HOST` is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte; otherwise STARTTLS when the server offers it
    pub secure: bool,
    /// Login, used only when both user and password are set
    pub credentials: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Deals JSON from `DEALS_JSON`, if set
    pub deals_json: Option<PathBuf>,
    pub users_json: PathBuf,
    pub preview_dir: PathBuf,
    pub site_dir: PathBuf,
    pub manage_url: String,
    pub top_n: usize,
    pub from_email: String,
    pub from_name: String,
    pub smtp: Option<SmtpSettings>,
    pub resend_api_key: Option<String>,
    pub brand: Brand,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let top_n = match var("DEALMAIL_TOP_N") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "DEALMAIL_TOP_N",
                value: raw,
            })?,
            None => DEFAULT_TOP_N,
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host: host.trim().to_string(),
                port: match var("SMTP_PORT") {
                    Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        var: "SMTP_PORT",
                        value: raw,
                    })?,
                    None => DEFAULT_SMTP_PORT,
                },
                secure: var("SMTP_SECURE").is_some_and(|v| v.trim() == "true"),
                credentials: var("SMTP_USER").zip(var("SMTP_PASS")),
            }),
            None => None,
        };

        let mut brand = Brand::default();
        if let Some(name) = var("DEALMAIL_BRAND_NAME") {
            brand.name = name;
        }

        Ok(Self {
            database_path: var("DEALMAIL_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            deals_json: var("DEALS_JSON").map(PathBuf::from),
            users_json: PathBuf::from(var("DEALMAIL_USERS_JSON").unwrap_or_else(|| DEFAULT_USERS_JSON.to_string())),
            preview_dir: PathBuf::from(var("DEALMAIL_PREVIEW_DIR").unwrap_or_else(|| "dist/previews".to_string())),
            site_dir: PathBuf::from(var("DEALMAIL_SITE_DIR").unwrap_or_else(|| "dist/site".to_string())),
            manage_url: var("DEALMAIL_MANAGE_URL").unwrap_or_else(|| DEFAULT_MANAGE_URL.to_string()),
            top_n,
            from_email: var("FROM_EMAIL").unwrap_or_else(|| "no-reply@example.com".to_string()),
            from_name: var("FROM_NAME").unwrap_or_else(|| "Prox Deals".to_string()),
            smtp,
            resend_api_key: var("RESEND_API_KEY"),
            brand,
        })
    }

    /// `Name <address>` sender line
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

/// `data/dealmail.db` under the project root (found by walking up from target/{debug,release})
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(Path::parent) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("dealmail.db");
    path
}

/// Resolve the deals JSON path: explicit argument, then a `--file=<path>` flag in `args`,
/// then the configured `DEALS_JSON`, then the bundled sample.
pub fn resolve_input_path<I, S>(explicit: Option<&Path>, args: I, env_path: Option<&Path>) -> PathBuf
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let flag = args.into_iter().find_map(|arg| {
        arg.as_ref()
            .strip_prefix("--file=")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    });

    flag.or_else(|| env_path.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEALS_JSON))
}
