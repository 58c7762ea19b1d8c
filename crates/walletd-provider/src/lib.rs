//! # WalletD Provider
//!
//! Pooled, rate-limited HTTP JSON client for Cosmos SDK LCD (REST)
//! endpoints.
//!
//! ## Features
//!
//! - Connection reuse through a single `reqwest::Client`
//! - Request rate limiting with `governor`
//! - Retries with exponential backoff on 429 and 5xx answers
//! - `404` surfaced as `None` for lookups of not-yet-indexed objects
//!
//! ## Example
//!
//! ```ignore
//! use walletd_provider::{presets, HttpClient};
//!
//! let client = HttpClient::new(presets::osmosis_mainnet())?;
//! let pool: serde_json::Value = client.get_json("osmosis/gamm/v1beta1/pools/1").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use walletd_resilience::{retry_if, BackoffConfig};

/// Provider-related errors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Client could not be built
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
        /// Response body, possibly truncated
        body: String,
    },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// True for failures worth retrying: throttling, server errors,
    /// timeouts and dropped connections
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Status code for [`ProviderError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

const MAX_ERROR_BODY: usize = 512;

/// Configuration for a provider endpoint
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the LCD endpoint
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum attempts per request, including the first
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl ProviderConfig {
    /// Creates a new provider configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 250,
        }
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the maximum attempts
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the initial retry delay
    pub fn with_retry_delay(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url().map(|_| ())
    }

    /// Parsed base URL; only http(s) is accepted
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ProviderError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, self.url
            ))),
        }
    }

    fn backoff(&self) -> BackoffConfig {
        BackoffConfig::new()
            .with_initial_delay(Duration::from_millis(self.retry_delay_ms))
            .with_max_attempts(self.max_retries.max(1))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        presets::osmosis_mainnet()
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout_secs: u64,
    /// Connection timeout
    pub connect_timeout_secs: u64,
    /// Request timeout
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Enable gzip compression
    pub gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 90,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("WalletD/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst size (max requests in a burst)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 20,
        }
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP JSON client bound to one LCD base URL.
///
/// Cheap to clone; clones share the connection pool, the rate limiter and
/// the request counter.
#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    client: Client,
    rate_limiter: Option<Arc<DirectLimiter>>,
    backoff: BackoffConfig,
    request_count: Arc<AtomicU64>,
}

impl HttpClient {
    /// Creates a client with default HTTP and rate-limit settings
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http_config = HttpClientConfig {
            request_timeout_secs: config.timeout_secs,
            ..Default::default()
        };
        Self::with_config(config, http_config, Some(RateLimitConfig::default()))
    }

    /// Creates a client with custom configuration
    pub fn with_config(
        config: ProviderConfig,
        http_config: HttpClientConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> Result<Self> {
        let base = config.base_url()?;

        let client = Client::builder()
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(http_config.pool_idle_timeout_secs))
            .connect_timeout(Duration::from_secs(http_config.connect_timeout_secs))
            .timeout(Duration::from_secs(http_config.request_timeout_secs))
            .user_agent(&http_config.user_agent)
            .gzip(http_config.gzip)
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        let rate_limiter = rate_limit.map(build_limiter).transpose()?;

        Ok(Self {
            base,
            client,
            rate_limiter,
            backoff: config.backoff(),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves a path below the base URL, keeping any base path prefix
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ProviderError::InvalidUrl(e.to_string()))
    }

    /// GET `path` and decode the JSON body, retrying transient failures
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        retry_if(self.backoff.clone(), ProviderError::is_transient, || {
            self.send_get::<T>(&url)
        })
        .await
        .map_err(|e| {
            tracing::debug!(url = %url, attempts = e.attempts, error = %e.last_error, "GET failed");
            e.last_error
        })
    }

    /// Like [`HttpClient::get_json`], but a `404` is `Ok(None)`
    pub async fn get_json_opt<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST a JSON body to `path` and decode the answer. Not retried.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        self.throttle().await;
        let response = self.client.post(url.clone()).json(body).send().await?;
        decode(url, response).await
    }

    /// Returns the number of requests sent
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    async fn send_get<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        self.throttle().await;
        tracing::trace!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        decode(url.clone(), response).await
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        self.request_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &self.base.as_str())
            .field("request_count", &self.request_count())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish()
    }
}

fn build_limiter(config: RateLimitConfig) -> Result<Arc<DirectLimiter>> {
    let rate = NonZeroU32::new(config.requests_per_second)
        .ok_or_else(|| ProviderError::InvalidConfig("requests_per_second must be > 0".into()))?;
    let burst = NonZeroU32::new(config.burst_size)
        .ok_or_else(|| ProviderError::InvalidConfig("burst_size must be > 0".into()))?;
    Ok(Arc::new(RateLimiter::direct(
        Quota::per_second(rate).allow_burst(burst),
    )))
}

async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(ProviderError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Public LCD endpoints
pub mod presets {
    use super::ProviderConfig;

    /// Osmosis mainnet LCD
    pub const OSMOSIS_LCD: &str = "https://lcd-osmosis.keplr.app";

    /// Cosmos Hub mainnet LCD
    pub const COSMOSHUB_LCD: &str = "https://lcd-cosmoshub.keplr.app";

    /// Osmosis mainnet provider configuration
    pub fn osmosis_mainnet() -> ProviderConfig {
        ProviderConfig::new(OSMOSIS_LCD).with_timeout(30)
    }

    /// Cosmos Hub mainnet provider configuration
    pub fn cosmoshub_mainnet() -> ProviderConfig {
        ProviderConfig::new(COSMOSHUB_LCD).with_timeout(30)
    }
}
