use async_trait::async_trait;
use ns_core::{Candidate, Error, Result};
use scraper::Selector;
use url::Url;

pub mod listing;

pub use listing::{ListingScraper, SelectorConfig};

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Downloads the raw HTML of a page
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Pulls the article candidates out of a listing page
    fn extract(&self, html: &str) -> Result<Vec<Candidate>>;
}

/// Common utilities for scrapers
pub mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {}", selector, e)))
    }

    /// Links without an `http:`/`https:` scheme get `https:` prepended, so
    /// protocol-relative `//host/path` links become absolute. Absolute links
    /// pass through untouched.
    pub fn normalize_url(link: &str) -> String {
        let link = link.trim();
        if has_http_scheme(link) {
            link.to_string()
        } else {
            format!("https:{}", link)
        }
    }

    fn has_http_scheme(link: &str) -> bool {
        ["http:", "https:"].iter().any(|scheme| {
            link.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
    }

    /// Trimmed text, or `None` when nothing but whitespace is left
    pub fn clean_text(text: &str) -> Option<String> {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }
}
