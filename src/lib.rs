use scraper::Html;
use serde::Serialize;
use std::{path::Path, sync::Arc};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod fetch;
pub mod filter;
pub mod rmrb;

mod data;
mod error;
mod utils;

pub use data::Table;
pub use error::CrawlerError;
pub use fetch::{Fetch, Fetcher};
pub use filter::{ArticleFilter, KeywordSet, MatchRecord, ResultEntry};

/// Records found on one page and how many entries were looked at.
#[derive(Debug, PartialEq, Eq)]
pub struct CrawlResult<R> {
    pub scanned: usize,
    pub records: Vec<R>,
}

pub trait Crawler {
    type Record: Send;

    fn crawl(&self, doc: &Html, base: &Url) -> CrawlResult<Self::Record>;
}

#[async_trait::async_trait]
pub trait Storage {
    type Record: Send;

    async fn queued_get(&self) -> Result<Vec<String>, CrawlerError>;
    async fn queued_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError>;
    async fn queued_delete<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError>;

    async fn visited_is_exists<I: AsRef<str> + Send>(&self, item: I) -> Result<bool, CrawlerError>;
    async fn visited_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError>;

    async fn warned_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError>;

    async fn results_count(&self) -> Result<u32, CrawlerError>;
    async fn results_insert<I: AsRef<str> + Send>(
        &self,
        (page, record): (I, Self::Record),
    ) -> Result<(), CrawlerError>;
    async fn results_get(&self) -> Result<Vec<Self::Record>, CrawlerError>;

    /// Drops queued pages that were already visited, returns how many.
    async fn prune_queued(&self) -> Result<u32, CrawlerError> {
        let mut pruned = 0;
        for q in self.queued_get().await? {
            if self.visited_is_exists(q.as_str()).await? {
                self.queued_delete(q.as_str()).await?;
                pruned += 1;
            }
        }
        Ok(pruned)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub failed: usize,
    pub scanned: usize,
    pub matched: usize,
}

enum PageOutcome {
    Done { scanned: usize, matched: usize },
    Failed,
}

/// Fetches every queued page once and stores the records the crawler finds.
///
/// The queue is seeded with `initial_queue` when empty, so an interrupted run
/// resumes where it stopped. Pages that cannot be fetched stay queued and are
/// also recorded as warned.
pub async fn run_scrapper<C, S, F>(
    crawler: C,
    storage: S,
    fetcher: F,
    initial_queue: Vec<String>,
) -> Result<RunSummary, CrawlerError>
where
    C: Crawler + Send + Sync + 'static,
    S: Storage<Record = C::Record> + Send + Sync + 'static,
    F: Fetch + Send + Sync + 'static,
{
    let storage = Arc::new(storage);
    let crawler = Arc::new(crawler);
    let fetcher = Arc::new(fetcher);

    let mut queue = storage.queued_get().await?;
    if queue.is_empty() {
        for q in &initial_queue {
            storage.queued_insert(q).await?;
        }
        queue = storage.queued_get().await?;
    }

    info!("Initial queue length: {}", queue.len());
    debug!("Stored results before run: {}", storage.results_count().await?);

    let mut handles = vec![];
    let mut skipped = 0;
    for url in queue {
        if storage.visited_is_exists(url.as_str()).await? {
            storage.queued_delete(url.as_str()).await?;
            skipped += 1;
            continue;
        }
        handles.push(tokio::spawn(handle(
            url,
            Arc::clone(&crawler),
            Arc::clone(&storage),
            Arc::clone(&fetcher),
        )));
    }

    if skipped > 0 && handles.is_empty() {
        info!(
            "All {} queued page(s) were already visited in this crawl, use another name to fetch them again",
            skipped
        );
    }

    let mut summary = RunSummary::default();
    for outcome in futures::future::join_all(handles).await {
        let outcome = match outcome {
            Ok(outcome) => outcome?,
            Err(e) => {
                warn!("Page task aborted: {}", e);
                PageOutcome::Failed
            }
        };
        summary.pages += 1;
        match outcome {
            PageOutcome::Done { scanned, matched } => {
                summary.scanned += scanned;
                summary.matched += matched;
            }
            PageOutcome::Failed => summary.failed += 1,
        }
    }

    info!(
        "Processed {} page(s), {} failed, matched [{}/{}]",
        summary.pages, summary.failed, summary.matched, summary.scanned
    );
    Ok(summary)
}

async fn handle<C, S, F>(
    url: String,
    crawler: Arc<C>,
    storage: Arc<S>,
    fetcher: Arc<F>,
) -> Result<PageOutcome, CrawlerError>
where
    C: Crawler,
    S: Storage<Record = C::Record>,
    F: Fetch,
{
    let url = url.as_str();

    let fetched = match Url::parse(url) {
        Ok(base) => fetcher.fetch(url).await.map(|html| (base, html)),
        Err(e) => Err(e.into()),
    };
    let (base, html) = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!("Skip {}: {}", url, e);
            storage.warned_insert(url).await?;
            return Ok(PageOutcome::Failed);
        }
    };

    let result = {
        let doc = Html::parse_document(&html);
        crawler.crawl(&doc, &base)
    };

    let scanned = result.scanned;
    let matched = result.records.len();
    for record in result.records {
        storage.results_insert((url, record)).await?;
    }
    storage.visited_insert(url).await?;
    storage.queued_delete(url).await?;

    info!("[{}/{}] {}", matched, scanned, url);
    Ok(PageOutcome::Done { scanned, matched })
}

/// Writes every stored record to `path` as a JSON array, returns how many.
pub async fn export<S>(storage: &S, path: &Path) -> Result<usize, CrawlerError>
where
    S: Storage + Sync,
    S::Record: Serialize,
{
    let records = storage.results_get().await?;
    let json = serde_json::to_string_pretty(&records)?;
    tokio::fs::write(path, json).await?;
    info!("Exported {} record(s) to {}", records.len(), path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_KEYWORDS;
    use crate::rmrb::{RmrbCrawler, RmrbData};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tokio::fs;

    struct StaticFetcher(HashMap<&'static str, String>);

    #[async_trait::async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, CrawlerError> {
            self.0
                .get(url)
                .cloned()
                .ok_or(CrawlerError::InvalidUrl(url::ParseError::EmptyHost))
        }
    }

    const PAGE1: &str = "http://data.people.com.cn/rmrb/s?qs=1";
    const PAGE2: &str = "http://data.people.com.cn/rmrb/s?qs=2";
    const MISSING: &str = "http://data.people.com.cn/rmrb/s?qs=404";

    fn fetcher() -> StaticFetcher {
        let search = std::fs::read_to_string("tests/htmls/search.html").expect("Invalid file url");
        let other = r#"<html><body><ul><li class="sreach_li">
            <a class="open_detail_link" href="/n/9.html">华中工学院成立</a>
            <div class="listinfo">人民日报</div>
        </li></ul></body></html>"#
            .to_string();
        StaticFetcher(HashMap::from([(PAGE1, search), (PAGE2, other)]))
    }

    fn crawler() -> RmrbCrawler {
        RmrbCrawler::new(KeywordSet::new(DEFAULT_KEYWORDS).unwrap())
    }

    async fn fresh(name: &str) -> RmrbData {
        let file = format!("{}.db", name);
        if Path::new(&file).is_file() {
            fs::remove_file(&file).await.unwrap();
        }
        RmrbData::new(name).await.unwrap()
    }

    #[tokio::test]
    async fn run_stores_matches_and_failures() {
        let storage = fresh("run_test1").await;
        let queue = vec![PAGE1.to_string(), PAGE2.to_string(), MISSING.to_string()];

        let summary = run_scrapper(crawler(), storage, fetcher(), queue)
            .await
            .unwrap();
        assert_eq!(
            summary,
            RunSummary {
                pages: 3,
                failed: 1,
                scanned: 7,
                matched: 5,
            }
        );

        let storage = RmrbData::new("run_test1").await.unwrap();
        assert_eq!(storage.results_count().await.unwrap(), 5);
        assert!(storage.visited.is_exist(PAGE1).await.unwrap());
        assert!(storage.visited.is_exist(PAGE2).await.unwrap());
        assert!(storage.warned.is_exist(MISSING).await.unwrap());
        assert_eq!(storage.queued_get().await.unwrap(), vec![MISSING.to_string()]);

        fs::remove_file("run_test1.db").await.unwrap();
    }

    #[tokio::test]
    async fn resumed_run_skips_visited_pages() {
        let storage = fresh("run_test2").await;
        storage.queued_insert(PAGE1).await.unwrap();
        storage.queued_insert(PAGE2).await.unwrap();
        storage.visited_insert(PAGE1).await.unwrap();

        let summary = run_scrapper(crawler(), storage, fetcher(), vec![MISSING.to_string()])
            .await
            .unwrap();
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.matched, 1);

        fs::remove_file("run_test2.db").await.unwrap();
    }

    #[tokio::test]
    async fn repeated_start_url_is_fetched_once() {
        let storage = fresh("run_test4").await;
        let queue = vec![PAGE2.to_string(), PAGE2.to_string()];

        let summary = run_scrapper(crawler(), storage, fetcher(), queue)
            .await
            .unwrap();
        assert_eq!(
            summary,
            RunSummary {
                pages: 1,
                failed: 0,
                scanned: 1,
                matched: 1,
            }
        );

        fs::remove_file("run_test4.db").await.unwrap();
    }

    #[tokio::test]
    async fn finished_crawl_fetches_nothing_again() {
        let storage = fresh("run_test5").await;
        run_scrapper(crawler(), storage, fetcher(), vec![PAGE2.to_string()])
            .await
            .unwrap();

        let storage = RmrbData::new("run_test5").await.unwrap();
        let summary = run_scrapper(crawler(), storage, fetcher(), vec![PAGE2.to_string()])
            .await
            .unwrap();
        assert_eq!(summary, RunSummary::default());

        let storage = RmrbData::new("run_test5").await.unwrap();
        assert_eq!(storage.queued_get().await.unwrap(), Vec::<String>::new());
        assert_eq!(storage.results_count().await.unwrap(), 1);

        fs::remove_file("run_test5.db").await.unwrap();
    }

    #[tokio::test]
    async fn export_writes_json_array() {
        let storage = fresh("run_test3").await;
        let record = MatchRecord {
            title: "同济医科大学".to_string(),
            url: "http://data.people.com.cn/n/1.html".to_string(),
            source: "人民日报".to_string(),
        };
        storage
            .results_insert((PAGE1, record.clone()))
            .await
            .unwrap();

        let path = Path::new("run_test3.json");
        assert_eq!(export(&storage, path).await.unwrap(), 1);

        let exported: Vec<MatchRecord> =
            serde_json::from_str(&fs::read_to_string(path).await.unwrap()).unwrap();
        assert_eq!(exported, vec![record]);

        fs::remove_file(path).await.unwrap();
        fs::remove_file("run_test3.db").await.unwrap();
    }
}
