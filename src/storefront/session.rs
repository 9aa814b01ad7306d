//! HTTP sessions with browser impersonation, shared across lookups.

use crate::config::Config;
use crate::storefront::error::FetchError;
use anyhow::{Context, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Browser identity presented for the lifetime of a session.
#[derive(Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: &'static str,
    pub platform: &'static str,
}

/// Identities a new session picks from.
pub const IDENTITIES: &[Identity] = &[
    Identity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "\"Windows\"",
    },
    Identity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "\"macOS\"",
    },
    Identity {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "\"Linux\"",
    },
];

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.9,en;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// Client settings applied when a session is created.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self { timeout: Duration::from_secs(config.timeout_secs), proxy: config.proxy.clone() }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), proxy: None }
    }
}

/// A reusable client with a fixed identity.
pub struct Session {
    client: Client,
    identity: &'static Identity,
}

impl Session {
    /// Builds a session with an identity chosen at random. No network I/O.
    pub fn new(options: &SessionOptions) -> Result<Self> {
        let identity = &IDENTITIES[rand::rng().random_range(0..IDENTITIES.len())];

        // gzip/brotli also set Accept-Encoding; a manual header would disable decoding
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(options.timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(wreq::redirect::Policy::limited(MAX_REDIRECTS));

        if let Some(proxy_url) = &options.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client, identity })
    }

    /// The identity this session presents on every request.
    pub fn identity(&self) -> &'static Identity {
        self.identity
    }

    /// Performs a GET with the session's identity headers and returns the body.
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", self.identity.user_agent)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("DNT", "1")
            .header("Sec-Ch-Ua", "\"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"")
            .header("Sec-Ch-Ua-Mobile", "?0")
            .header("Sec-Ch-Ua-Platform", self.identity.platform)
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). Consider using a proxy or increasing delay.");
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::Body)
    }
}

/// Owns the shared session: created on first use, dropped on close.
pub struct SessionManager {
    options: SessionOptions,
    current: Mutex<Option<Arc<Session>>>,
}

impl SessionManager {
    pub fn new(options: SessionOptions) -> Self {
        Self { options, current: Mutex::new(None) }
    }

    /// Returns the open session, creating one if none is open.
    ///
    /// Concurrent callers share a single creation.
    pub async fn acquire(&self) -> Result<Arc<Session>> {
        let mut current = self.current.lock().await;

        if let Some(session) = current.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(Session::new(&self.options)?);
        info!("Opened HTTP session ({})", session.identity.platform);
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Releases the session. Safe to call when nothing is open.
    ///
    /// Connections close once in-flight lookups drop their handles.
    pub async fn close(&self) {
        if self.current.lock().await.take().is_some() {
            info!("Closed HTTP session");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.current.lock().await.is_some()
    }
}
