//! CSS selectors for storefront HTML parsing.
//!
//! All selectors used against search and product pages live here.
//! Update this file when the storefront changes its HTML structure.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use crate::storefront::models::PriceCategory;
use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for search results pages.
pub mod search {
    use super::*;

    /// Result title links (any class containing `s-link`).
    pub static RESULT_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[class*='s-link']").unwrap());

    /// Result headings, used when no title link matched.
    pub static RESULT_HEADING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2.s-size-mini").unwrap());

    /// Anchor inside a result heading.
    pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    /// Path segment that marks a product detail URL.
    pub const PRODUCT_PATH: &str = "/dp/";
}

/// A price query and the offer category it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorRule {
    pub query: &'static str,
    pub category: PriceCategory,
}

impl SelectorRule {
    pub const fn new(query: &'static str, category: PriceCategory) -> Self {
        Self { query, category }
    }
}

/// Product page price rules, most specific first.
///
/// Used-copy prices beat marketplace prices, which beat the generic price
/// display.
pub const PRICE_RULES: &[SelectorRule] = &[
    // Used copies block
    SelectorRule::new("#usedAccordionRow .a-price .a-offscreen", PriceCategory::Used),
    SelectorRule::new(
        "[data-feature-name='usedAccordion'] .a-price .a-offscreen",
        PriceCategory::Used,
    ),
    // More buying choices
    SelectorRule::new("#mbc .a-price .a-offscreen", PriceCategory::Marketplace),
    SelectorRule::new(
        "[data-feature-name='moreBuyingChoices'] .a-price .a-offscreen",
        PriceCategory::Marketplace,
    ),
    // Generic price display
    SelectorRule::new(".a-price.a-text-price.a-size-medium .a-offscreen", PriceCategory::General),
    SelectorRule::new(".a-price .a-offscreen", PriceCategory::General),
];

/// Selectors for detecting error/captcha pages.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });

    /// Dog page (the storefront's 503 page).
    ///
    /// Matches only markers of the error page itself. Cover images carry the
    /// book title as alt text, so a bare "dog" substring is not a signal.
    pub static DOG_PAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "img[alt*='Dogs of Amazon'], \
             a[href*='cs_503_link']",
        )
        .unwrap()
    });
}
