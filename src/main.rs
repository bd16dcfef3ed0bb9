use std::path::PathBuf;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use roocash_crawler::crawler::{Crawler, Kind};
use roocash_crawler::driver::chrome::{ChromeDriver, ChromeOptions};
use roocash_crawler::storage::StorageManager;
use roocash_crawler::{CrawlError, Settings};

/// Scrapes roo.cash product listings and blog articles to JSON and CSV.
#[derive(Debug, Parser)]
#[command(name = "roocash-crawler", version)]
struct Cli {
    /// What to crawl. Repeat for several; defaults to everything.
    #[arg(long = "kind", value_enum)]
    kinds: Vec<Kind>,

    /// Where artifacts are written (overrides ROOCASH_OUTPUT_DIR).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Page ceiling for paginated listings (overrides ROOCASH_MAX_PAGES).
    #[arg(long)]
    max_pages: Option<usize>,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    if let Some(max_pages) = cli.max_pages {
        settings.max_pages = max_pages;
    }
    if cli.headed {
        settings.headless = false;
    }

    let mut kinds: Vec<Kind> = Vec::new();
    for kind in cli.kinds {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        kinds = Kind::ALL.to_vec();
    }

    let storage = StorageManager::new(&settings.output_dir)?;
    let driver = ChromeDriver::launch(&ChromeOptions {
        headless: settings.headless,
        element_timeout: settings.element_wait_timeout,
    })
    .map_err(CrawlError::DriverInit)?;

    let crawler = Crawler::new(&driver, &storage, &settings);
    let mut failed = 0;
    for kind in kinds {
        info!(?kind, "starting run");
        match crawler.run(kind).await {
            Ok(summary) => summary.log(),
            Err(e) => {
                failed += 1;
                error!(?kind, error = %e, "run failed");
            }
        }
    }

    driver.close();
    info!(output = %settings.output_dir.display(), "all runs done");
    if failed > 0 {
        anyhow::bail!("{failed} run(s) failed");
    }
    Ok(())
}
