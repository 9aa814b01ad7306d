//! ISBN to price lookup: search, resolve, wait, fetch, extract.

use crate::config::Config;
use crate::storefront::extractor::PriceExtractor;
use crate::storefront::models::{Isbn, PriceResult};
use crate::storefront::resolver::ProductResolver;
use crate::storefront::session::{SessionManager, SessionOptions};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Books-only search scope on the storefront.
const BOOKS_CATEGORY: &str = "stripbooks";
const SEARCH_REF: &str = "sr_nr_n_1";

/// Host of the live storefront. Requests to it never wait less than
/// [`LIVE_DELAY_MS`] before a product fetch.
const LIVE_HOST: &str = "amazon.co.jp";
const LIVE_DELAY_MS: (u64, u64) = (1000, 2000);

/// Anything that can answer price lookups - enables mocking for tests.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Looks up a price. `Ok(None)` means no price was found.
    async fn lookup(&self, isbn: &Isbn) -> Result<Option<PriceResult>>;

    /// Releases held resources. Called once at teardown.
    async fn shutdown(&self) {}
}

/// Scraping pipeline that turns an ISBN into at most one price.
pub struct PriceLookup {
    base_url: Url,
    sessions: SessionManager,
    resolver: ProductResolver,
    extractor: PriceExtractor,
    delay_ms: (u64, u64),
}

impl PriceLookup {
    /// Creates a pipeline from configuration. No network I/O happens here.
    pub fn new(config: &Config) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid storefront URL: {}", config.base_url))?;

        // Mirrors may live under a path prefix; keep it when joining "s"
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let delay_ms = delay_bounds(&base_url, config.delay_range_ms());

        Ok(Self {
            resolver: ProductResolver::new(base_url.clone()),
            base_url,
            sessions: SessionManager::new(SessionOptions::from_config(config)),
            extractor: PriceExtractor::default(),
            delay_ms,
        })
    }

    /// The session manager backing this pipeline.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Looks up the price for an ISBN.
    ///
    /// Request failures, missing results and unparsable pages all yield
    /// `Ok(None)`. `Err` is only returned when no session can be created.
    pub async fn lookup(&self, isbn: &Isbn) -> Result<Option<PriceResult>> {
        let session = self.sessions.acquire().await?;

        info!("Searching storefront for ISBN: {}", isbn);
        let search_html = match session.get(self.search_url(isbn).as_str()).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Search failed for ISBN {}: {}", isbn, e);
                return Ok(None);
            }
        };

        let Some(product_url) = self.resolver.resolve(&search_html) else {
            info!("Product not found for ISBN: {}", isbn);
            return Ok(None);
        };
        debug!("Resolved {} to {}", isbn, product_url);

        self.delay().await;

        let product_html = match session.get(product_url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Product page fetch failed for {}: {}", product_url, e);
                return Ok(None);
            }
        };

        let price = self.extractor.extract(&product_html);
        match &price {
            Some(p) => info!("Found {} price: ¥{} for {}", p.category, p.amount, product_url),
            None => info!("No price found for {}", product_url),
        }

        Ok(price)
    }

    /// Closes the shared session. The next lookup opens a new one.
    pub async fn shutdown(&self) {
        self.sessions.close().await;
    }

    fn search_url(&self, isbn: &Isbn) -> Url {
        let mut url = self.base_url.join("s").unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("k", isbn.as_str())
            .append_pair("i", BOOKS_CATEGORY)
            .append_pair("ref", SEARCH_REF);
        url
    }

    /// Waits a random time within the configured bounds before a product fetch.
    async fn delay(&self) {
        let (min, max) = self.delay_ms;
        let total_delay = rand::rng().random_range(min..=max);

        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

/// Raises configured delay bounds to the live-storefront floor.
///
/// Other hosts (mirrors, local test servers) use the bounds as configured.
fn delay_bounds(base_url: &Url, (min, max): (u64, u64)) -> (u64, u64) {
    let live = base_url
        .host_str()
        .is_some_and(|host| host == LIVE_HOST || host.ends_with(&format!(".{}", LIVE_HOST)));
    if !live {
        return (min, max);
    }

    let (floor_min, floor_max) = LIVE_DELAY_MS;
    let bounds = (min.max(floor_min), max.max(floor_max));
    if bounds != (min, max) {
        warn!(
            "Delay {}..={}ms is below the storefront minimum, using {}..={}ms",
            min, max, bounds.0, bounds.1
        );
    }
    bounds
}

#[async_trait]
impl PriceSource for PriceLookup {
    async fn lookup(&self, isbn: &Isbn) -> Result<Option<PriceResult>> {
        PriceLookup::lookup(self, isbn).await
    }

    async fn shutdown(&self) {
        PriceLookup::shutdown(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> Config {
        Config { delay_min_ms: 0, delay_max_ms: 0, ..Config::default() }
    }

    #[test]
    fn test_search_url() {
        let lookup = PriceLookup::new(&make_test_config()).unwrap();
        let isbn = Isbn::parse("9784123456789").unwrap();

        let url = lookup.search_url(&isbn);
        assert_eq!(
            url.as_str(),
            "https://www.amazon.co.jp/s?k=9784123456789&i=stripbooks&ref=sr_nr_n_1"
        );
    }

    #[test]
    fn test_search_url_custom_base() {
        let config = Config { base_url: "http://127.0.0.1:9999".to_string(), ..make_test_config() };
        let lookup = PriceLookup::new(&config).unwrap();
        let isbn = Isbn::parse("123456789X").unwrap();

        let url = lookup.search_url(&isbn);
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/s?k=123456789X&i=stripbooks&ref=sr_nr_n_1");
    }

    #[test]
    fn test_search_url_keeps_mirror_prefix() {
        for base in ["http://127.0.0.1:9999/mirror", "http://127.0.0.1:9999/mirror/"] {
            let config = Config { base_url: base.to_string(), ..make_test_config() };
            let lookup = PriceLookup::new(&config).unwrap();
            let isbn = Isbn::parse("9784123456789").unwrap();

            assert_eq!(
                lookup.search_url(&isbn).as_str(),
                "http://127.0.0.1:9999/mirror/s?k=9784123456789&i=stripbooks&ref=sr_nr_n_1"
            );
        }
    }

    #[test]
    fn test_live_storefront_delay_cannot_be_disabled() {
        let lookup = PriceLookup::new(&make_test_config()).unwrap();
        assert_eq!(lookup.delay_ms, (1000, 2000));

        let config = Config { delay_min_ms: 1500, delay_max_ms: 5000, ..make_test_config() };
        assert_eq!(PriceLookup::new(&config).unwrap().delay_ms, (1500, 5000));

        let config = Config { base_url: "https://amazon.co.jp".to_string(), ..make_test_config() };
        assert_eq!(PriceLookup::new(&config).unwrap().delay_ms, (1000, 2000));
    }

    #[test]
    fn test_local_storefront_uses_configured_delay() {
        let config = Config { base_url: "http://127.0.0.1:9999".to_string(), ..make_test_config() };
        assert_eq!(PriceLookup::new(&config).unwrap().delay_ms, (0, 0));

        let config = Config {
            base_url: "https://notamazon.co.jp.example".to_string(),
            ..make_test_config()
        };
        assert_eq!(PriceLookup::new(&config).unwrap().delay_ms, (0, 0));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config { base_url: "not a url".to_string(), ..make_test_config() };
        let result = PriceLookup::new(&config);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Invalid storefront URL"));
    }

    #[tokio::test]
    async fn test_new_does_not_open_session() {
        let lookup = PriceLookup::new(&make_test_config()).unwrap();
        assert!(!lookup.sessions().is_open().await);
    }

    #[tokio::test]
    async fn test_delay_within_bounds() {
        let config = Config {
            base_url: "http://127.0.0.1:9999".to_string(),
            delay_min_ms: 20,
            delay_max_ms: 40,
            ..make_test_config()
        };
        let lookup = PriceLookup::new(&config).unwrap();

        let start = std::time::Instant::now();
        lookup.delay().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
