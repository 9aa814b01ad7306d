//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront origin searched for ISBNs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lower bound of the delay before each product page fetch
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the delay before each product page fetch
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Gateway bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Gateway port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the gateway's CORS policy
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Maximum ISBNs per batch request
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_base_url() -> String {
    "https://www.amazon.co.jp".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_delay_min_ms() -> u64 {
    1000
}

fn default_delay_max_ms() -> u64 {
    2000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://127.0.0.1:3000".to_string(), "http://localhost:3000".to_string()]
}

fn default_max_batch() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            max_batch: default_max_batch(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bookprice").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparsable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("BOOKPRICE_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("BOOKPRICE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("BOOKPRICE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        if let Ok(host) = std::env::var("BOOKPRICE_HOST") {
            self.host = host;
        }

        if let Ok(port) = std::env::var("BOOKPRICE_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(origins) = std::env::var("BOOKPRICE_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        self
    }

    /// Delay bounds in milliseconds, ordered low to high.
    pub fn delay_range_ms(&self) -> (u64, u64) {
        if self.delay_min_ms <= self.delay_max_ms {
            (self.delay_min_ms, self.delay_max_ms)
        } else {
            (self.delay_max_ms, self.delay_min_ms)
        }
    }

    /// Gateway socket address as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.amazon.co.jp");
        assert!(config.proxy.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.delay_min_ms, 1000);
        assert_eq!(config.delay_max_ms, 2000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.allowed_origins, vec!["http://127.0.0.1:3000", "http://localhost:3000"]);
        assert_eq!(config.max_batch, 10);
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            base_url = "http://localhost:8080"
            delay_min_ms = 1500
            delay_max_ms = 4000
            port = 8000
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.delay_min_ms, 1500);
        assert_eq!(config.delay_max_ms, 4000);
        assert_eq!(config.port, 8000);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            base_url = "https://example.test"
            proxy = "socks5://localhost:1080"
            timeout_secs = 10
            delay_min_ms = 500
            delay_max_ms = 900
            host = "0.0.0.0"
            port = 9000
            allowed_origins = ["https://app.example.test"]
            max_batch = 5
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.delay_range_ms(), (500, 900));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.allowed_origins, vec!["https://app.example.test"]);
        assert_eq!(config.max_batch, 5);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_delay_range_reordered() {
        let config = Config { delay_min_ms: 3000, delay_max_ms: 1000, ..Config::default() };
        assert_eq!(config.delay_range_ms(), (1000, 3000));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            timeout_secs = 45
            max_batch = 3
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.max_batch, 3);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"host = "0.0.0.0""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_config_with_env() {
        let orig_port = std::env::var("BOOKPRICE_PORT").ok();
        let orig_origins = std::env::var("BOOKPRICE_ALLOWED_ORIGINS").ok();
        let orig_timeout = std::env::var("BOOKPRICE_TIMEOUT").ok();

        std::env::set_var("BOOKPRICE_PORT", "4000");
        std::env::set_var("BOOKPRICE_ALLOWED_ORIGINS", "http://a.test, http://b.test,");
        std::env::set_var("BOOKPRICE_TIMEOUT", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.port, 4000);
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        // Invalid values are ignored
        assert_eq!(config.timeout_secs, 30);

        match orig_port {
            Some(v) => std::env::set_var("BOOKPRICE_PORT", v),
            None => std::env::remove_var("BOOKPRICE_PORT"),
        }
        match orig_origins {
            Some(v) => std::env::set_var("BOOKPRICE_ALLOWED_ORIGINS", v),
            None => std::env::remove_var("BOOKPRICE_ALLOWED_ORIGINS"),
        }
        match orig_timeout {
            Some(v) => std::env::set_var("BOOKPRICE_TIMEOUT", v),
            None => std::env::remove_var("BOOKPRICE_TIMEOUT"),
        }
    }
}
