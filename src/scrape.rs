//! Offline deal scraper
//!
//! Reads a saved retailer page whose deals are marked up as data attributes:
//!
//! ```html
//! <div class="deal"
//!      data-retailer="Sprouts"
//!      data-product="Wild Caught Salmon Fillet"
//!      data-size="per lb"
//!      data-price="8.99"
//!      data-start="2025-09-01"
//!      data-end="2025-09-07"
//!      data-category="protein"></div>
//! ```
//!
//! Only static markup is handled; nothing is fetched or executed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SOURCE: &str = "data/sprouts.sample.html";
pub const DEFAULT_RETAILER: &str = "Sprouts";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Could not read sample HTML at \"{path}\". Make sure the file exists. Original error: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One deal as found on the page, in the deals-feed JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedDeal {
    pub retailer: String,
    pub product: String,
    pub size: Option<String>,
    pub price: f64,
    /// YYYY-MM-DD, as written on the page
    pub start: String,
    pub end: String,
    pub category: Option<String>,
}

// ============================================================================
// Tag Reading
// ============================================================================

/// An opening tag and its attributes (names lowercased, values entity-decoded)
#[derive(Debug, Clone, PartialEq)]
struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
}

impl StartTag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Collect every opening tag in document order. Comments, closing tags and
/// declarations are skipped.
fn start_tags(html: &str) -> Vec<StartTag> {
    let chars: Vec<char> = html.chars().collect();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '<' {
            i += 1;
            continue;
        }

        if chars[i..].starts_with(&['<', '!', '-', '-']) {
            i = find_seq(&chars, i + 4, &['-', '-', '>']).map(|end| end + 3).unwrap_or(chars.len());
            continue;
        }

        if !chars.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic()) {
            // "</div>", "<!doctype ...>", stray "<"
            i += 1;
            continue;
        }

        let (tag, next) = read_start_tag(&chars, i + 1);
        tags.push(tag);
        i = next;
    }

    tags
}

fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j..].starts_with(seq))
}

/// Read a tag starting just after '<'. Returns the tag and the index after its '>'.
fn read_start_tag(chars: &[char], mut i: usize) -> (StartTag, usize) {
    let name_start = i;
    while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '>' && chars[i] != '/' {
        i += 1;
    }
    let name: String = chars[name_start..i].iter().collect::<String>().to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        if chars[i] == '>' {
            i += 1;
            break;
        }

        let key_start = i;
        while i < chars.len() && !chars[i].is_whitespace() && !matches!(chars[i], '=' | '>' | '/') {
            i += 1;
        }
        let key: String = chars[key_start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if chars.get(i) != Some(&'=') {
            attrs.push((key, String::new()));
            continue;
        }
        i += 1;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        let value: String = match chars.get(i) {
            Some(&quote) if quote == '"' || quote == '\'' => {
                let value_start = i + 1;
                let value_end = (value_start..chars.len())
                    .find(|&j| chars[j] == quote)
                    .unwrap_or(chars.len());
                i = (value_end + 1).min(chars.len());
                chars[value_start..value_end].iter().collect()
            }
            _ => {
                let value_start = i;
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '>' {
                    i += 1;
                }
                chars[value_start..i].iter().collect()
            }
        };
        attrs.push((key, decode_entities(&value)));
    }

    (StartTag { name, attrs }, i)
}

// ============================================================================
// Extraction
// ============================================================================

fn trimmed_attr(tag: &StartTag, name: &str) -> String {
    tag.attr(name).unwrap_or("").trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Extract well-formed deals: must have a product and a numeric price
pub fn extract_deals(html: &str) -> Vec<ScrapedDeal> {
    start_tags(html)
        .iter()
        .filter(|tag| tag.has_class("deal"))
        .filter_map(|tag| {
            let product = trimmed_attr(tag, "data-product");
            let price_raw = trimmed_attr(tag, "data-price");
            let price = price_raw.parse::<f64>().ok().filter(|p| p.is_finite());

            let Some(price) = price.filter(|_| !product.is_empty()) else {
                debug!("Skipping <{}> deal block: product '{}', price '{}'", tag.name, product, price_raw);
                return None;
            };

            let retailer = non_empty(trimmed_attr(tag, "data-retailer"))
                .unwrap_or_else(|| DEFAULT_RETAILER.to_string());

            Some(ScrapedDeal {
                retailer,
                product,
                size: non_empty(trimmed_attr(tag, "data-size")),
                price,
                start: trimmed_attr(tag, "data-start"),
                end: trimmed_attr(tag, "data-end"),
                category: non_empty(trimmed_attr(tag, "data-category")),
            })
        })
        .collect()
}

/// Scrape a saved HTML file
pub fn scrape_file(source: &Path) -> Result<Vec<ScrapedDeal>, ScrapeError> {
    let html = fs::read_to_string(source).map_err(|source_err| ScrapeError::Read {
        path: source.display().to_string(),
        source: source_err,
    })?;
    let deals = extract_deals(&html);
    info!("Scraped {} deals from {}", deals.len(), source.display());
    Ok(deals)
}

/// Write deals as pretty JSON, creating the parent directory if needed
pub fn write_deals_json(path: &Path, deals: &[ScrapedDeal]) -> Result<(), ScrapeError> {
    let write_err = |source: std::io::Error| ScrapeError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(deals)?;
    fs::write(path, json).map_err(write_err)?;
    Ok(())
}
