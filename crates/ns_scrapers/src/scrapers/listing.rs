use async_trait::async_trait;
use ns_core::{Candidate, Result};
use scraper::{ElementRef, Html, Selector};
use super::utils;
use super::Scraper;

/// CSS selectors describing a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub article: String,
    pub headline: String,
    pub summary: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            article: "article".to_string(),
            headline: ".story > span > a".to_string(),
            summary: ".body > div > i".to_string(),
        }
    }
}

/// Scrapes a single listing page made of repeated article blocks.
#[derive(Debug, Clone)]
pub struct ListingScraper {
    client: reqwest::Client,
    article: Selector,
    headline: Selector,
    summary: Selector,
}

impl ListingScraper {
    pub fn new() -> Result<Self> {
        Self::with_selectors(SelectorConfig::default())
    }

    pub fn with_selectors(config: SelectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ns_scrapers/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            article: utils::parse_selector(&config.article)?,
            headline: utils::parse_selector(&config.headline)?,
            summary: utils::parse_selector(&config.summary)?,
        })
    }

    fn extract_candidate(&self, block: ElementRef<'_>) -> Option<Candidate> {
        let link = block.select(&self.headline).next()?;
        let href = link.value().attr("href")?;
        if href.trim().is_empty() {
            return None;
        }

        let headline = utils::clean_text(&link.text().collect::<String>());
        let summary = block
            .select(&self.summary)
            .next()
            .and_then(|el| utils::clean_text(&el.text().collect::<String>()));

        Some(Candidate {
            headline,
            url: utils::normalize_url(href),
            summary,
        })
    }
}

#[async_trait]
impl Scraper for ListingScraper {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    fn extract(&self, html: &str) -> Result<Vec<Candidate>> {
        let document = Html::parse_document(html);
        Ok(document
            .select(&self.article)
            .filter_map(|block| self.extract_candidate(block))
            .collect())
    }
}
