use clap::Parser;
use rmrb_crawler::config::{Cli, Config};
use rmrb_crawler::rmrb::{RmrbCrawler, RmrbData};
use rmrb_crawler::{export, run_scrapper, Fetcher};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "debug,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let config = Config::try_from(Cli::parse())?;
    info!("Keywords: {}", config.keywords);

    let crawler = RmrbCrawler::new(config.keywords.clone());
    let fetcher = Fetcher::new(config.request_delay, config.attempts);
    let storage = RmrbData::new(&config.name).await?;

    run_scrapper(crawler, storage, fetcher, config.start_urls.clone()).await?;

    if let Some(path) = config.export.as_deref() {
        let storage = RmrbData::new(&config.name).await?;
        export(&storage, path).await?;
    }

    Ok(())
}
