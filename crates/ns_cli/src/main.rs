use clap::Parser;
use ns_scrapers::{logging, ListingScraper, ScraperArgs, ScraperManager};
use ns_web::AppState;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://news_scrape.db";
const DEFAULT_NEWS_SITE: &str = "https://slashdot.org/";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a trailing bare number is seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape a news listing into a store and serve it", long_about = None)]
struct Cli {
    /// Store connection string (memory://, sqlite://path)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
    /// Listing page to scrape
    #[arg(long, env = "NEWS_SITE", default_value = DEFAULT_NEWS_SITE)]
    site: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the article pages and API
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Directory served for paths no route matches
        #[arg(long, default_value = ns_web::state::DEFAULT_STATIC_DIR)]
        static_dir: PathBuf,
        /// Also scrape in the background on this interval (e.g. 30m, 1h, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Scrape the configured site once, or periodically with --interval
    Scrape {
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Lower-level scraper commands
    Scraper(ScraperArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();
    let cli = Cli::parse();

    let storage = ns_storage::create_storage(&cli.database_url).await?;
    let scraper = Arc::new(ListingScraper::new()?);
    let manager = Arc::new(ScraperManager::new(storage.clone(), scraper, &cli.site)?);

    match cli.command {
        Commands::Serve { port, static_dir, interval } => {
            if let Some(HumanDuration(interval)) = interval {
                let manager = manager.clone();
                info!(site = %manager.site(), ?interval, "⏰ Background scraping enabled");
                tokio::spawn(async move { manager.run_periodic(interval).await });
            }
            let app = ns_web::create_app(AppState::new(storage, manager).with_static_dir(static_dir));
            ns_web::serve(app, port).await?;
        }
        Commands::Scrape { interval: Some(HumanDuration(interval)) } => {
            info!(site = %manager.site(), ?interval, "⏰ Scraping periodically");
            manager.run_periodic(interval).await;
        }
        Commands::Scrape { interval: None } => {
            let report = manager.scrape_site().await?;
            println!("{}", report);
        }
        Commands::Scraper(args) => {
            ns_scrapers::handle_command(&manager, args).await?;
        }
    }

    Ok(())
}
