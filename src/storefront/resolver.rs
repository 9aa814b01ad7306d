//! Picks the product page URL out of a search results page.

use crate::storefront::blocked;
use crate::storefront::selectors::search;
use scraper::{ElementRef, Html};
use tracing::{debug, trace, warn};
use url::Url;

/// How many search results are considered, in document order.
pub const MAX_CANDIDATES: usize = 3;

/// Resolves the first product detail link on a search results page.
#[derive(Debug, Clone)]
pub struct ProductResolver {
    base_url: Url,
}

impl ProductResolver {
    /// Creates a resolver that joins relative links onto `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Returns the product URL of the first qualifying result, if any.
    ///
    /// Only the first [`MAX_CANDIDATES`] result links are looked at; later
    /// results tend to be sponsored or accessory listings.
    pub fn resolve(&self, html: &str) -> Option<Url> {
        let document = Html::parse_document(html);

        if let Some(block) = blocked::detect(&document) {
            warn!("Search returned a {}", block);
            return None;
        }

        let candidates = Self::candidates(&document);
        debug!("Found {} search result links", candidates.len());

        candidates
            .into_iter()
            .take(MAX_CANDIDATES)
            .filter_map(|link| link.value().attr("href"))
            .find(|href| href.contains(search::PRODUCT_PATH))
            .and_then(|href| match self.base_url.join(href) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Ignoring unparsable product link {}: {}", href, e);
                    None
                }
            })
    }

    /// Result links in document order, falling back to result headings.
    fn candidates(document: &Html) -> Vec<ElementRef<'_>> {
        let links: Vec<_> = document.select(&search::RESULT_LINK).collect();
        if !links.is_empty() {
            return links;
        }

        trace!("No result links, trying result headings");
        document
            .select(&search::RESULT_HEADING)
            .filter_map(|heading| heading.select(&search::ANCHOR).next())
            .collect()
    }
}
