//! Keyword filtering over the entries of one search-result page.
//!
//! The filter only sees entries through [`ResultEntry`], so it does not care
//! which HTML parser produced them.

use crate::CrawlerError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// One search hit as seen by the filter.
pub trait ResultEntry {
    /// All text under the title link, joined in document order.
    /// `None` when the entry has no title link.
    fn title(&self) -> Option<String>;

    /// The `href` of the title link, relative or absolute.
    fn link(&self) -> Option<String>;

    /// The first text of the byline element, untrimmed.
    fn source(&self) -> Option<String>;
}

/// Literal keywords matched as plain substrings of a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Result<Self, CrawlerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Vec<String> = vec![];
        for keyword in keywords {
            let keyword = keyword.into();
            if keyword.is_empty() {
                return Err(CrawlerError::EmptyKeyword);
            }
            if !set.contains(&keyword) {
                set.push(keyword);
            }
        }
        Ok(KeywordSet(set))
    }

    /// First keyword contained in `title`, if any.
    pub fn find_in(&self, title: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|keyword| title.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub title: String,
    pub url: String,
    pub source: String,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title   : {}", self.title)?;
        writeln!(f, "Url     : {}", self.url)?;
        writeln!(f, "Source  : {}", self.source)
    }
}

#[derive(Debug, Clone)]
pub struct ArticleFilter {
    keywords: KeywordSet,
}

impl ArticleFilter {
    pub fn new(keywords: KeywordSet) -> Self {
        ArticleFilter { keywords }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Yields a record for every entry whose title contains a keyword,
    /// in the order the entries are given.
    pub fn filter<'a, I>(
        &'a self,
        entries: I,
        base: &'a Url,
    ) -> impl Iterator<Item = MatchRecord> + 'a
    where
        I: IntoIterator + 'a,
        I::IntoIter: 'a,
        I::Item: ResultEntry,
    {
        entries
            .into_iter()
            .filter_map(move |entry| self.check(&entry, base))
    }

    fn check<E: ResultEntry>(&self, entry: &E, base: &Url) -> Option<MatchRecord> {
        let title = entry.title()?;
        let keyword = self.keywords.find_in(&title)?;
        debug!("Found keyword {} in article {}", keyword, title);

        let Some(link) = entry.link() else {
            warn!("Matched article has no link: {}", title);
            return None;
        };
        let url = match resolve(base, &link) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot resolve link {:?} of {}: {}", link, title, e);
                return None;
            }
        };

        let source = entry
            .source()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Some(MatchRecord { title, url, source })
    }
}

/// Resolves `link` against `base`. Surrounding whitespace is dropped, absolute
/// links otherwise come back unchanged.
pub fn resolve(base: &Url, link: &str) -> Result<String, url::ParseError> {
    let link = link.trim();
    match Url::parse(link) {
        Ok(_) => Ok(link.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(link)?.to_string()),
        Err(e) => Err(e),
    }
}
