//! Price extraction from product pages via an ordered selector fallback chain.

use crate::storefront::blocked;
use crate::storefront::models::{PriceCategory, PriceResult};
use crate::storefront::price::parse_price;
use crate::storefront::selectors::{SelectorRule, PRICE_RULES};
use scraper::{Html, Selector};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
struct CompiledRule {
    query: &'static str,
    selector: Selector,
    category: PriceCategory,
}

/// Walks a product page through price rules until one yields a price.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    rules: Vec<CompiledRule>,
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new(PRICE_RULES)
    }
}

impl PriceExtractor {
    /// Compiles the given rules. Rules that fail to parse are skipped.
    pub fn new(rules: &[SelectorRule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Selector::parse(rule.query) {
                Ok(selector) => {
                    Some(CompiledRule { query: rule.query, selector, category: rule.category })
                }
                Err(e) => {
                    warn!("Skipping invalid price selector '{}': {}", rule.query, e);
                    None
                }
            })
            .collect();

        Self { rules }
    }

    /// Number of usable rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Extracts the price from product page HTML.
    ///
    /// Rules are tried in order and each rule's matches in document order;
    /// the first element whose text parses to a positive amount wins.
    pub fn extract(&self, html: &str) -> Option<PriceResult> {
        let document = Html::parse_document(html);

        if let Some(block) = blocked::detect(&document) {
            warn!("Product page is a {}", block);
            return None;
        }

        self.extract_from(&document)
    }

    /// Runs the fallback chain over an already parsed document.
    pub fn extract_from(&self, document: &Html) -> Option<PriceResult> {
        for rule in &self.rules {
            for element in document.select(&rule.selector) {
                let text = element.text().collect::<String>();
                let text = text.trim();

                match parse_price(text) {
                    Some(amount) if amount > 0 => {
                        debug!("Matched '{}' ({}): {}", rule.query, rule.category, amount);
                        return Some(PriceResult::new(amount, rule.category));
                    }
                    _ => trace!("Unusable price text '{}' for '{}'", text, rule.query),
                }
            }
        }

        None
    }
}
