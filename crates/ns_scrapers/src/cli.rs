use clap::{Args, Subcommand};
use ns_core::Result;
use crate::manager::ScraperManager;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Fetch a listing page and print the extracted candidates without storing them
    Extract {
        /// Page to fetch instead of the configured site
        #[arg(long)]
        url: Option<String>,
    },
    /// Scrape a single listing page into the store
    Page {
        /// Page to scrape instead of the configured site
        #[arg(long)]
        url: Option<String>,
    },
}

pub async fn handle_command(manager: &ScraperManager, args: ScraperArgs) -> Result<()> {
    match args.command {
        ScraperCommands::Extract { url } => {
            let url = url.as_deref().unwrap_or(manager.site());
            let candidates = manager.extract(url).await?;
            println!("Found {} articles", candidates.len());
            for candidate in candidates {
                println!(
                    "- {} - {}",
                    candidate.headline.as_deref().unwrap_or("(untitled)"),
                    candidate.url
                );
                if let Some(summary) = candidate.summary {
                    println!("    {}", summary);
                }
            }
        }
        ScraperCommands::Page { url } => {
            let url = url.as_deref().unwrap_or(manager.site());
            let report = manager.scrape_url(url).await?;
            println!("🆕 {}", report);
        }
    }
    Ok(())
}
