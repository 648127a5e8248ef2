//! Email delivery
//!
//! Transports are tried in order: an SMTP relay when `SMTP_HOST` is set, the Resend HTTP API
//! when an API key is configured, otherwise preview files so a run never needs network access.

use std::fs;
use std::path::{Path, PathBuf};

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::{Config, SmtpSettings};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Could not write preview {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A rendered email ready to hand to a transport
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// What a transport did with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { id: Option<String> },
    Preview { html_path: PathBuf, text_path: PathBuf },
}

/// Email transport
pub trait Mailer {
    fn name(&self) -> &'static str;

    fn send(&self, message: &EmailMessage) -> Result<Delivery, MailError>;
}

// ============================================================================
// Preview Files
// ============================================================================

/// Writes `<recipient>.html` and `<recipient>.txt` into a directory instead of sending
#[derive(Debug, Clone)]
pub struct PreviewMailer {
    dir: PathBuf,
}

impl PreviewMailer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn write(path: &Path, contents: &str) -> Result<(), MailError> {
        fs::write(path, contents).map_err(|source| MailError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Mailer for PreviewMailer {
    fn name(&self) -> &'static str {
        "preview"
    }

    fn send(&self, message: &EmailMessage) -> Result<Delivery, MailError> {
        fs::create_dir_all(&self.dir).map_err(|source| MailError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let stem = safe_file_stem(&message.to);
        let html_path = self.dir.join(format!("{stem}.html"));
        let text_path = self.dir.join(format!("{stem}.txt"));
        Self::write(&html_path, &message.html)?;
        Self::write(&text_path, &message.text)?;

        info!("(dry-run) Wrote previews to {}/{}.{{html,txt}}", self.dir.display(), stem);
        Ok(Delivery::Preview { html_path, text_path })
    }
}

/// Replace everything except ASCII letters, digits and `@._-` with `_`
pub fn safe_file_stem(recipient: &str) -> String {
    recipient
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Resend API
// ============================================================================

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

/// Sends through the Resend REST API
pub struct ResendMailer {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }

    /// Point at a different API base (e.g. a local mock)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Mailer for ResendMailer {
    fn name(&self) -> &'static str {
        "resend"
    }

    fn send(&self, message: &EmailMessage) -> Result<Delivery, MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body: ResendResponse = response.json()?;
        info!("Resend sent: {}", body.id.as_deref().unwrap_or("<no id>"));
        Ok(Delivery::Sent { id: body.id })
    }
}

// ============================================================================
// SMTP Relay
// ============================================================================

/// Sends through an SMTP relay (e.g. Mailtrap) as a text + HTML alternative message
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Build the transport. No connection is made until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.secure {
            SmtpTransport::relay(&settings.host)?
        } else {
            SmtpTransport::builder_dangerous(&settings.host)
                .tls(Tls::Opportunistic(TlsParameters::new(settings.host.clone())?))
        };

        let builder = match &settings.credentials {
            Some((user, pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            None => builder,
        };

        Ok(Self {
            transport: builder.port(settings.port).build(),
        })
    }
}

/// Convert a rendered email into a MIME message with plain-text and HTML parts
pub fn mime_message(message: &EmailMessage) -> Result<Message, MailError> {
    let email = Message::builder()
        .from(message.from.parse::<Mailbox>()?)
        .to(message.to.parse::<Mailbox>()?)
        .subject(message.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            message.text.clone(),
            message.html.clone(),
        ))?;
    Ok(email)
}

impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn send(&self, message: &EmailMessage) -> Result<Delivery, MailError> {
        let response = self.transport.send(&mime_message(message)?)?;
        let id = response.first_line().map(str::to_string);
        info!("SMTP sent: {}", id.as_deref().unwrap_or("<no reply>"));
        Ok(Delivery::Sent { id })
    }
}

/// Pick the transport the configuration allows: SMTP, then Resend, then preview files
pub fn mailer_from_config(config: &Config) -> Result<Box<dyn Mailer>, MailError> {
    if let Some(smtp) = &config.smtp {
        return Ok(Box::new(SmtpMailer::new(smtp)?));
    }
    Ok(match &config.resend_api_key {
        Some(key) => Box::new(ResendMailer::new(key.clone())),
        None => Box::new(PreviewMailer::new(config.preview_dir.clone())),
    })
}

/// Per-recipient preferences link: `base` with `email` as a query parameter
pub fn manage_url(base: &str, email: &str) -> Result<String, MailError> {
    let url = Url::parse_with_params(base, &[("email", email)])?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("dealmail_send_{}", name));
        let _ = fs::remove_dir_all(&p);
        p
    }

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "Prox Deals <no-reply@example.com>".to_string(),
            to: to.to_string(),
            subject: "Prox Weekly Deals — Top 1".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
        }
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("Ava.B-c_d@Example.com"), "Ava.B-c_d@Example.com");
        assert_eq!(safe_file_stem("ava+deals@example.com"), "ava_deals@example.com");
        assert_eq!(safe_file_stem("a b/c"), "a_b_c");
    }

    #[test]
    fn test_preview_mailer_writes_both_parts() {
        let dir = tmp_dir("preview");
        let mailer = PreviewMailer::new(&dir);
        let delivery = mailer.send(&message("ava+x@example.com")).unwrap();

        let html_path = dir.join("ava_x@example.com.html");
        let text_path = dir.join("ava_x@example.com.txt");
        assert_eq!(
            delivery,
            Delivery::Preview {
                html_path: html_path.clone(),
                text_path: text_path.clone()
            }
        );
        assert_eq!(fs::read_to_string(html_path).unwrap(), "<p>hi</p>");
        assert_eq!(fs::read_to_string(text_path).unwrap(), "hi");
    }

    #[test]
    fn test_mailer_selection() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(mailer_from_config(&config).unwrap().name(), "preview");

        config.resend_api_key = Some("re_test".to_string());
        assert_eq!(mailer_from_config(&config).unwrap().name(), "resend");

        // SMTP wins over Resend when both are configured
        config.smtp = Some(SmtpSettings {
            host: "localhost".to_string(),
            port: 2525,
            secure: false,
            credentials: Some(("user".to_string(), "pass".to_string())),
        });
        assert_eq!(mailer_from_config(&config).unwrap().name(), "smtp");

        config.resend_api_key = None;
        assert_eq!(mailer_from_config(&config).unwrap().name(), "smtp");
    }

    #[test]
    fn test_mime_message_has_both_parts() {
        let mut msg = message("ava@example.com");
        msg.text = "plain body".to_string();
        msg.html = "<p>html body</p>".to_string();

        let raw = String::from_utf8(mime_message(&msg).unwrap().formatted()).unwrap();
        assert!(raw.contains("To: ava@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("plain body"));
        assert!(raw.contains("<p>html body</p>"));
    }

    #[test]
    fn test_mime_message_rejects_bad_address() {
        let err = mime_message(&message("not an address")).unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
    }

    /// Serve one canned HTTP response on a local port. The handle yields the raw request.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (format!("http://{addr}/emails"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn local_resend(endpoint: &str) -> ResendMailer {
        let mut mailer = ResendMailer::new("k").with_endpoint(endpoint);
        // Loopback requests must not be routed through an environment proxy
        mailer.client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        mailer
    }

    #[test]
    fn test_resend_success_returns_id() {
        let (endpoint, server) = serve_once("200 OK", r#"{"id":"x"}"#);
        let delivery = local_resend(&endpoint).send(&message("a@b.c")).unwrap();
        assert_eq!(delivery, Delivery::Sent { id: Some("x".to_string()) });

        let request = server.join().unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /emails "));
        assert!(lower.contains("authorization: bearer k\r\n"));
        assert!(request.contains(r#""to":"a@b.c""#));
    }

    #[test]
    fn test_resend_error_status() {
        let (endpoint, server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"name":"validation_error","message":"Invalid `to` field"}"#,
        );
        let err = local_resend(&endpoint).send(&message("a@b.c")).unwrap_err();
        match err {
            MailError::Api { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("validation_error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_manage_url_encodes_email() {
        assert_eq!(
            manage_url("https://example.com/preferences", "ava+x@example.com").unwrap(),
            "https://example.com/preferences?email=ava%2Bx%40example.com"
        );
        assert!(manage_url("not a url", "a@b.c").is_err());
    }

    #[test]
    fn test_message_serializes_for_api() {
        let json = serde_json::to_value(message("a@b.c")).unwrap();
        assert_eq!(json["to"], "a@b.c");
        assert_eq!(json["from"], "Prox Deals <no-reply@example.com>");
    }
}
