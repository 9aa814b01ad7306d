//! Output formatting for price reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::storefront::PriceReport;

/// Formats price reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single report.
    pub fn format_report(&self, report: &PriceReport) -> String {
        match self.format {
            OutputFormat::Json => self.json_single(report),
            OutputFormat::Table => self.table_single(report),
            OutputFormat::Markdown => self.markdown_single(report),
            OutputFormat::Csv => self.csv_reports(std::slice::from_ref(report)),
        }
    }

    /// Formats multiple reports.
    pub fn format_reports(&self, reports: &[PriceReport]) -> String {
        if reports.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No ISBNs looked up.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_reports(reports),
            OutputFormat::Table => self.table_reports(reports),
            OutputFormat::Markdown => self.markdown_reports(reports),
            OutputFormat::Csv => self.csv_reports(reports),
        }
    }

    // JSON formatting

    fn json_single(&self, report: &PriceReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_reports(&self, reports: &[PriceReport]) -> String {
        serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_single(&self, report: &PriceReport) -> String {
        let mut lines = vec![format!("ISBN:      {}", report.isbn)];

        match (report.price, &report.error) {
            (Some(amount), _) => {
                lines.push(format!("Price:     {} {}", report.currency, amount));
                if let Some(category) = report.category {
                    lines.push(format!("Offer:     {}", category));
                }
                if let Some(availability) = report.availability {
                    lines.push(format!("Status:    {}", availability));
                }
            }
            (None, Some(error)) => lines.push(format!("Error:     {}", error)),
            (None, None) => lines.push("Price:     N/A".to_string()),
        }

        lines.join("\n")
    }

    fn table_reports(&self, reports: &[PriceReport]) -> String {
        let isbn_width = 13;
        let price_width = 10;
        let offer_width = 11;

        let mut lines = Vec::new();

        // Header
        lines.push(format!(
            "{:<isbn_width$}  {:>price_width$}  {:<offer_width$}  {}",
            "ISBN", "Price", "Offer", "Note"
        ));
        lines.push(format!(
            "{:-<isbn_width$}  {:-<price_width$}  {:-<offer_width$}  {:-<20}",
            "", "", "", ""
        ));

        // Rows
        for report in reports {
            let price_str = match report.price {
                Some(amount) => format!("¥{}", amount),
                None => "N/A".to_string(),
            };
            let offer_str = report.category.map(|c| c.to_string()).unwrap_or_default();
            let note = report.error.as_deref().unwrap_or("");

            lines.push(format!(
                "{:<isbn_width$}  {:>price_width$}  {:<offer_width$}  {}",
                report.isbn, price_str, offer_str, note
            ));
        }

        let found = reports.iter().filter(|r| r.is_found()).count();
        lines.push(String::new());
        lines.push(format!("{} of {} prices found", found, reports.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, report: &PriceReport) -> String {
        let mut lines = vec![format!("## ISBN {}", report.isbn), String::new()];

        match report.price {
            Some(amount) => {
                lines.push(format!("- **Price:** ¥{} ({})", amount, report.currency));
                if let Some(category) = report.category {
                    lines.push(format!("- **Offer:** {}", category));
                }
            }
            None => {
                let error = report.error.as_deref().unwrap_or("N/A");
                lines.push(format!("- **Error:** {}", error));
            }
        }

        lines.join("\n")
    }

    fn markdown_reports(&self, reports: &[PriceReport]) -> String {
        let mut lines =
            vec!["| ISBN | Price | Offer | Note |".to_string(), "|---|---:|---|---|".to_string()];

        for report in reports {
            let price_str = report.price.map(|a| format!("¥{}", a)).unwrap_or("N/A".to_string());
            let offer_str = report.category.map(|c| c.to_string()).unwrap_or_default();
            let note = report.error.as_deref().unwrap_or("");
            lines.push(format!("| {} | {} | {} | {} |", report.isbn, price_str, offer_str, note));
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "isbn,price,currency,availability,category,error".to_string()
    }

    fn csv_reports(&self, reports: &[PriceReport]) -> String {
        let mut lines = vec![self.csv_header()];

        for report in reports {
            lines.push(format!(
                "{},{},{},{},{},{}",
                csv_escape(&report.isbn),
                report.price.map(|p| p.to_string()).unwrap_or_default(),
                report.currency,
                report.availability.map(|a| a.to_string()).unwrap_or_default(),
                report.category.map(|c| c.to_string()).unwrap_or_default(),
                csv_escape(report.error.as_deref().unwrap_or("")),
            ));
        }

        lines.join("\n")
    }
}

/// Quotes a CSV field when it contains separators or quotes.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
