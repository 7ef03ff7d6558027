use rmrb_crawler::rmrb::RmrbData;
use rmrb_crawler::Storage;

async fn prune_queued(name: &str) -> Result<(), rmrb_crawler::CrawlerError> {
    let p = RmrbData::new(name).await?;
    let pruned = p.prune_queued().await?;
    println!("Delete {}", pruned);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "rmrb".to_string());
    prune_queued(&name).await?;
    Ok(())
}
