pub mod scrapers;
pub mod cli;
pub mod logging;
pub mod manager;

pub use manager::{ArticleStatus, IngestReport, ScraperManager};

pub use cli::{ScraperArgs, ScraperCommands, handle_command};
pub use scrapers::{ListingScraper, Scraper, SelectorConfig};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use ns_core::{Candidate, Result, Error};
}
