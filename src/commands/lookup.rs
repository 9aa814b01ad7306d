//! ISBN price lookup command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::storefront::{Isbn, PriceLookup, PriceReport, PriceSource};
use anyhow::{Context, Result};
use tracing::{error, info};

/// Message reported when a lookup finds no price.
pub const NOT_FOUND: &str = "Price information not found";

/// Looks up each ISBN in order and reports one outcome per input.
///
/// Inputs are cleaned of hyphens and spaces first. Invalid ISBNs are
/// reported without touching the network; lookups run strictly one after
/// another.
pub async fn lookup_reports<S>(source: &S, isbns: &[String]) -> Vec<PriceReport>
where
    S: PriceSource + ?Sized,
{
    let mut reports = Vec::with_capacity(isbns.len());

    for raw in isbns {
        let isbn = match Isbn::parse(raw) {
            Ok(isbn) => isbn,
            Err(e) => {
                reports.push(PriceReport::failed(Isbn::clean(raw), e.to_string()));
                continue;
            }
        };

        let report = match source.lookup(&isbn).await {
            Ok(Some(price)) => PriceReport::found(isbn.as_str(), &price),
            Ok(None) => PriceReport::failed(isbn.as_str(), NOT_FOUND),
            Err(e) => {
                error!("Error fetching price for {}: {:#}", isbn, e);
                PriceReport::failed(isbn.as_str(), e.to_string())
            }
        };
        reports.push(report);
    }

    reports
}

/// Executes price lookups for one or more ISBNs.
pub struct LookupCommand {
    config: Config,
}

impl LookupCommand {
    /// Creates a new lookup command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Looks up the ISBNs and returns formatted output.
    pub async fn execute(&self, isbns: &[String]) -> Result<String> {
        let pipeline = PriceLookup::new(&self.config).context("Failed to create lookup pipeline")?;

        let output = self.execute_with_source(&pipeline, isbns).await;
        pipeline.shutdown().await;
        output
    }

    /// Looks up the ISBNs with a provided source (for testing).
    pub async fn execute_with_source(
        &self,
        source: &impl PriceSource,
        isbns: &[String],
    ) -> Result<String> {
        if isbns.len() > self.config.max_batch {
            anyhow::bail!("Maximum {} ISBNs per request (got {})", self.config.max_batch, isbns.len());
        }

        info!("Looking up {} ISBN(s)", isbns.len());
        let reports = lookup_reports(source, isbns).await;

        let formatter = Formatter::new(self.config.format);
        Ok(match reports.as_slice() {
            [report] => formatter.format_report(report),
            _ => formatter.format_reports(&reports),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::storefront::{PriceCategory, PriceResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock price source for testing.
    struct MockPriceSource {
        price: Option<PriceResult>,
        should_fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl MockPriceSource {
        fn new(price: Option<PriceResult>) -> Self {
            Self { price, should_fail: false, seen: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { price: None, should_fail: true, seen: Mutex::new(Vec::new()) }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PriceSource for MockPriceSource {
        async fn lookup(&self, isbn: &Isbn) -> Result<Option<PriceResult>> {
            self.seen.lock().unwrap().push(isbn.to_string());
            if self.should_fail {
                anyhow::bail!("Simulated session error")
            }
            Ok(self.price.clone())
        }
    }

    fn make_test_config() -> Config {
        Config { delay_min_ms: 0, delay_max_ms: 0, ..Config::default() }
    }

    fn isbns(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reports_found_and_missing() {
        let source = MockPriceSource::new(Some(PriceResult::new(800, PriceCategory::Used)));
        let reports = lookup_reports(&source, &isbns(&["978-4-12-345678-9"])).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].isbn, "9784123456789");
        assert_eq!(reports[0].price, Some(800));

        let source = MockPriceSource::new(None);
        let reports = lookup_reports(&source, &isbns(&["9784123456789"])).await;
        assert_eq!(reports[0].error.as_deref(), Some(NOT_FOUND));
    }

    #[tokio::test]
    async fn test_reports_invalid_isbn_skips_lookup() {
        let source = MockPriceSource::new(Some(PriceResult::new(800, PriceCategory::Used)));
        let reports = lookup_reports(&source, &isbns(&["9784123456789", "invalid-isbn"])).await;

        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_found());
        assert_eq!(reports[1].isbn, "invalidisbn");
        assert_eq!(reports[1].error.as_deref(), Some("Invalid ISBN format"));
        assert_eq!(source.seen(), vec!["9784123456789"]);
    }

    #[tokio::test]
    async fn test_reports_preserve_order() {
        let source = MockPriceSource::new(None);
        let input = isbns(&["9784000000001", "4000000002", "9794000000003"]);
        let reports = lookup_reports(&source, &input).await;

        let order: Vec<_> = reports.iter().map(|r| r.isbn.as_str()).collect();
        assert_eq!(order, vec!["9784000000001", "4000000002", "9794000000003"]);
        assert_eq!(source.seen(), input);
    }

    #[tokio::test]
    async fn test_reports_source_error() {
        let source = MockPriceSource::failing();
        let reports = lookup_reports(&source, &isbns(&["9784123456789"])).await;
        assert!(reports[0].error.as_deref().unwrap().contains("Simulated session error"));
    }

    #[tokio::test]
    async fn test_command_single() {
        let source = MockPriceSource::new(Some(PriceResult::new(1200, PriceCategory::General)));
        let cmd = LookupCommand::new(make_test_config());

        let output = cmd.execute_with_source(&source, &isbns(&["9784123456789"])).await.unwrap();
        assert!(output.contains("9784123456789"));
        assert!(output.contains("JPY 1200"));
    }

    #[tokio::test]
    async fn test_command_batch_json() {
        let source = MockPriceSource::new(Some(PriceResult::new(1200, PriceCategory::General)));
        let mut config = make_test_config();
        config.format = OutputFormat::Json;
        let cmd = LookupCommand::new(config);

        let output = cmd
            .execute_with_source(&source, &isbns(&["9784123456789", "123456789X"]))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_command_batch_limit() {
        let source = MockPriceSource::new(None);
        let cmd = LookupCommand::new(make_test_config());

        let too_many: Vec<String> = (0..11).map(|i| format!("978412345678{}", i % 10)).collect();
        let result = cmd.execute_with_source(&source, &too_many).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Maximum 10 ISBNs"));
        assert!(source.seen().is_empty());
    }
}
