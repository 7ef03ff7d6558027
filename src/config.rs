//! Crawl configuration.
//!
//! Everything here is plain data fixed before the crawl starts: the
//! keywords the filter looks for, the archive queries to fetch and how
//! politely to fetch them. The command line can override each default.

use crate::{filter::KeywordSet, CrawlerError};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "华中工学院",
    "华中科技大学",
    "华中理工大学",
    "武汉医学院",
    "同济医科大学",
    "同济医学院",
];

/// Archive title searches, one per institution name, newest first, 500 hits per page.
pub const DEFAULT_START_URLS: [&str; 6] = [
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%A7%91%E6%8A%80%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%A7%91%E6%8A%80%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%A7%91%E6%8A%80%E5%A4%A7%E5%AD%A6%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E5%B7%A5%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E5%B7%A5%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E5%B7%A5%E5%AD%A6%E9%99%A2%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%90%86%E5%B7%A5%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%90%86%E5%B7%A5%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%8D%8E%E4%B8%AD%E7%90%86%E5%B7%A5%E5%A4%A7%E5%AD%A6%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E6%AD%A6%E6%B1%89%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E6%AD%A6%E6%B1%89%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E6%AD%A6%E6%B1%89%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E5%AD%A6%E9%99%A2%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
    "http://data.people.com.cn/rmrb/s?qs=%7B%22cds%22%3A%5B%7B%22cdr%22%3A%22AND%22%2C%22cds%22%3A%5B%7B%22fld%22%3A%22title%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E7%A7%91%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22subTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E7%A7%91%E5%A4%A7%E5%AD%A6%22%7D%2C%7B%22fld%22%3A%22introTitle%22%2C%22cdr%22%3A%22OR%22%2C%22hlt%22%3A%22true%22%2C%22vlr%22%3A%22OR%22%2C%22val%22%3A%22%E5%90%8C%E6%B5%8E%E5%8C%BB%E7%A7%91%E5%A4%A7%E5%AD%A6%22%7D%5D%7D%5D%2C%22obs%22%3A%5B%7B%22fld%22%3A%22dataTime%22%2C%22drt%22%3A%22DESC%22%7D%5D%7D&tr=A&ss=1&pageNo=1&pageSize=500",
];

/// Command-line arguments for the archive crawler.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Name of the crawl, the SQLite file is `<name>.db`
    #[arg(short, long, default_value = "rmrb")]
    pub name: String,

    /// Keyword to look for in titles, repeat for several (defaults to the built-in list)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Search page to fetch, repeat for several (defaults to the built-in queries)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Minimum delay between two requests in milliseconds
    #[arg(long, default_value_t = 200)]
    pub delay_ms: u64,

    /// Attempts per page before it is recorded as failed
    #[arg(long, default_value_t = 5)]
    pub attempts: u32,

    /// Write every stored match to this JSON file after the crawl
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub keywords: KeywordSet,
    pub start_urls: Vec<String>,
    pub request_delay: Duration,
    pub attempts: u32,
    pub export: Option<PathBuf>,
}

impl TryFrom<Cli> for Config {
    type Error = CrawlerError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let keywords = if cli.keywords.is_empty() {
            KeywordSet::new(DEFAULT_KEYWORDS)?
        } else {
            KeywordSet::new(cli.keywords)?
        };

        let start_urls = if cli.urls.is_empty() {
            DEFAULT_START_URLS.iter().map(ToString::to_string).collect()
        } else {
            cli.urls
        };

        Ok(Config {
            name: cli.name,
            keywords,
            start_urls,
            request_delay: Duration::from_millis(cli.delay_ms),
            attempts: cli.attempts.max(1),
            export: cli.export,
        })
    }
}
