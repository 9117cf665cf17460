use futures::future::join_all;
use ns_core::{ArticleStore, Candidate, Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use crate::scrapers::{utils, Scraper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    New,
    Duplicate,
}

/// Outcome counts of one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub candidates: usize,
    pub created: usize,
    pub duplicates: usize,
}

impl IngestReport {
    pub fn message(&self) -> String {
        if self.created > 0 {
            format!(
                "Created {} articles, and {} articles already existing",
                self.created,
                self.candidates - self.created
            )
        } else {
            "No new articles".to_string()
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

async fn create_article(storage: &dyn ArticleStore, candidate: Candidate) -> Result<ArticleStatus> {
    match storage.create(candidate).await {
        Ok(_) => Ok(ArticleStatus::New),
        Err(e) if e.is_duplicate_key() => Ok(ArticleStatus::Duplicate),
        Err(e) => Err(e),
    }
}

pub struct ScraperManager {
    storage: Arc<dyn ArticleStore>,
    scraper: Arc<dyn Scraper>,
    site: String,
}

impl ScraperManager {
    pub fn new(storage: Arc<dyn ArticleStore>, scraper: Arc<dyn Scraper>, site: &str) -> Result<Self> {
        utils::parse_url(site)?;
        Ok(Self {
            storage,
            scraper,
            site: site.to_string(),
        })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStore> {
        &self.storage
    }

    /// Fetch a listing page and return its candidates without storing them
    pub async fn extract(&self, url: &str) -> Result<Vec<Candidate>> {
        let html = self.scraper.fetch(url).await?;
        let candidates = self.scraper.extract(&html)?;
        info!(url = %url, count = candidates.len(), "🔍 Extracted candidates");
        Ok(candidates)
    }

    /// Attempts every insert concurrently and waits for all of them. Duplicates
    /// count as zero. Any other failure is logged; once every attempt has
    /// settled the first one is returned.
    pub async fn ingest(&self, candidates: Vec<Candidate>) -> Result<IngestReport> {
        let mut report = IngestReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        let handles: Vec<JoinHandle<(String, Result<ArticleStatus>)>> = candidates
            .into_iter()
            .map(|candidate| {
                let storage = self.storage.clone();
                tokio::spawn(async move {
                    let url = candidate.url.clone();
                    (url, create_article(storage.as_ref(), candidate).await)
                })
            })
            .collect();

        let mut first_error = None;
        for joined in join_all(handles).await {
            match joined {
                Ok((_, Ok(ArticleStatus::New))) => report.created += 1,
                Ok((_, Ok(ArticleStatus::Duplicate))) => report.duplicates += 1,
                Ok((url, Err(e))) => {
                    error!(url = %url, error = %e, "❌ Failed to store article");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!(error = %e, "❌ Insert task failed");
                    first_error.get_or_insert(Error::External(e.into()));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            candidates = report.candidates,
            created = report.created,
            duplicates = report.duplicates,
            "💾 Ingest finished"
        );
        Ok(report)
    }

    pub async fn scrape_url(&self, url: &str) -> Result<IngestReport> {
        let candidates = self.extract(url).await?;
        self.ingest(candidates).await
    }

    pub async fn scrape_site(&self) -> Result<IngestReport> {
        self.scrape_url(&self.site).await
    }

    /// Scrape the configured site every `interval`, starting immediately.
    /// A failed run is logged and the loop keeps going.
    pub async fn run_periodic(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.scrape_site().await {
                Ok(report) => info!(site = %self.site, "📰 {}", report),
                Err(e) => error!(site = %self.site, error = %e, "❌ Scheduled scrape failed"),
            }
        }
    }
}
