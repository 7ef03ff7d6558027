mod crawler;
mod data;

pub use crawler::RmrbCrawler;
pub use data::RmrbData;

use crate::filter::ResultEntry;
use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

const E: &str = "Invalid selector";
lazy_static! {
    pub(crate) static ref ENTRY: Selector = Selector::parse(".sreach_li").expect(E);
    static ref TITLE_LINK: Selector = Selector::parse("a.open_detail_link").expect(E);
    static ref LIST_INFO: Selector = Selector::parse("div.listinfo").expect(E);
}

/// One `.sreach_li` item of an archive search page.
#[derive(Debug, Clone, Copy)]
pub struct SearchEntry<'a>(pub ElementRef<'a>);

impl<'a> ResultEntry for SearchEntry<'a> {
    fn title(&self) -> Option<String> {
        let mut links = self.0.select(&TITLE_LINK).peekable();
        links.peek()?;
        Some(links.flat_map(|a| a.text()).collect())
    }

    fn link(&self) -> Option<String> {
        self.0
            .select(&TITLE_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(ToString::to_string)
    }

    // Only direct text children of the byline count, nested tags are skipped.
    fn source(&self) -> Option<String> {
        self.0
            .select(&LIST_INFO)
            .flat_map(|info| info.children())
            .find_map(|node| node.value().as_text().map(|t| t.text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn first_entry(html: &Html) -> SearchEntry<'_> {
        SearchEntry(html.select(&ENTRY).next().expect("No entry"))
    }

    #[test]
    fn title_joins_text_nodes() {
        let html = Html::parse_fragment(
            r#"<ul><li class="sreach_li">
                <a class="open_detail_link" href="/n/1.html">武汉<b>医学院</b>揭牌</a>
                <div class="listinfo">  人民日报 <span>1980-01-01</span></div>
            </li></ul>"#,
        );
        let entry = first_entry(&html);

        assert_eq!(entry.title().as_deref(), Some("武汉医学院揭牌"));
        assert_eq!(entry.link().as_deref(), Some("/n/1.html"));
        assert_eq!(entry.source().as_deref(), Some("  人民日报 "));
    }

    #[test]
    fn missing_parts_are_none() {
        let html = Html::parse_fragment(r#"<ul><li class="sreach_li"><span>x</span></li></ul>"#);
        let entry = first_entry(&html);

        assert_eq!(entry.title(), None);
        assert_eq!(entry.link(), None);
        assert_eq!(entry.source(), None);
    }

    #[test]
    fn link_without_href() {
        let html = Html::parse_fragment(
            r#"<ul><li class="sreach_li"><a class="open_detail_link">同济医学院</a></li></ul>"#,
        );
        let entry = first_entry(&html);

        assert_eq!(entry.title().as_deref(), Some("同济医学院"));
        assert_eq!(entry.link(), None);
    }
}
