use std::path::PathBuf;
use std::sync::Arc;
use ns_core::ArticleStore;
use ns_scrapers::ScraperManager;

pub const DEFAULT_STATIC_DIR: &str = "public";

pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub scraper: Arc<ScraperManager>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, scraper: Arc<ScraperManager>) -> Self {
        Self {
            store,
            scraper,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }

    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }
}
