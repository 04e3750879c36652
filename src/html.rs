//! Anchor extraction from fetched pages.

use scraper::{Html, Selector};
use url::Url;

/// An anchor resolved against the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub url: Url,
    rel: Vec<String>,
}

impl PageLink {
    /// True when the anchor declared `token` in its rel attribute.
    pub fn has_rel(&self, token: &str) -> bool {
        self.rel.iter().any(|declared| declared == token)
    }
}

/// Collects every anchor with an href, resolved against `base`. Anchors
/// whose href does not resolve are skipped. Parsing recovers from broken
/// markup per HTML5 rules and never fails; rel tokens are lowercased.
pub fn extract_links(html: &str, base: &Url) -> Vec<PageLink> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };
        let rel = element
            .value()
            .attr("rel")
            .map(|rel| {
                rel.split_whitespace()
                    .map(|token| token.to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_default();
        links.push(PageLink { url, rel });
    }

    links
}
