use super::{SearchEntry, ENTRY};
use crate::{
    filter::{ArticleFilter, KeywordSet, MatchRecord},
    CrawlResult, Crawler,
};
use scraper::Html;
use url::Url;

/// Filters People's Daily archive search pages by title keywords.
#[derive(Debug, Clone)]
pub struct RmrbCrawler {
    filter: ArticleFilter,
}

impl RmrbCrawler {
    pub fn new(keywords: KeywordSet) -> Self {
        RmrbCrawler {
            filter: ArticleFilter::new(keywords),
        }
    }
}

impl Crawler for RmrbCrawler {
    type Record = MatchRecord;

    fn crawl(&self, doc: &Html, base: &Url) -> CrawlResult<Self::Record> {
        let entries: Vec<_> = doc.select(&ENTRY).map(SearchEntry).collect();
        let scanned = entries.len();
        let records = self.filter.filter(entries, base).collect();

        CrawlResult { scanned, records }
    }
}
