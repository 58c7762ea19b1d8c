//! Osmosis swapper configuration

use crate::osmosis::constants::{
    COSMO_OSMO_CHANNEL, DEFAULT_POOL_ID, DEFAULT_USD_POOL_ID, OSMO_COSMO_CHANNEL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;
use walletd_error::{ErrorContext, Phase, Result, SwapError, SwapErrorKind};
use walletd_provider::{presets, ProviderConfig};
use walletd_resilience::PollConfig;

/// Environment variable overriding [`OsmosisSwapperConfig::osmo_url`]
pub const ENV_OSMO_URL: &str = "WALLETD_OSMO_URL";
/// Environment variable overriding [`OsmosisSwapperConfig::cosmos_url`]
pub const ENV_COSMOS_URL: &str = "WALLETD_COSMOS_URL";
/// Environment variable overriding the settlement poll interval
pub const ENV_POLL_INTERVAL_SECS: &str = "WALLETD_POLL_INTERVAL_SECS";
/// Environment variable overriding the settlement poll timeout
pub const ENV_POLL_TIMEOUT_SECS: &str = "WALLETD_POLL_TIMEOUT_SECS";

/// Endpoints and tunables of the Osmosis swapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmosisSwapperConfig {
    /// Osmosis LCD base URL
    pub osmo_url: String,
    /// Cosmos Hub LCD base URL
    pub cosmos_url: String,
    /// ATOM/OSMO pool
    pub pool_id: u64,
    /// OSMO/USDC pool, used for USD pricing
    pub usd_pool_id: u64,
    /// IBC channel on the Cosmos Hub towards Osmosis
    pub cosmos_to_osmo_channel: String,
    /// IBC channel on Osmosis towards the Cosmos Hub
    pub osmo_to_cosmos_channel: String,
    /// Seconds between settlement checks
    pub poll_interval_secs: u64,
    /// Seconds before a settlement wait gives up
    pub poll_timeout_secs: u64,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Attempts per LCD request, including the first
    pub max_retries: u32,
}

impl Default for OsmosisSwapperConfig {
    fn default() -> Self {
        let poll = PollConfig::default();
        Self {
            osmo_url: presets::OSMOSIS_LCD.to_string(),
            cosmos_url: presets::COSMOSHUB_LCD.to_string(),
            pool_id: DEFAULT_POOL_ID,
            usd_pool_id: DEFAULT_USD_POOL_ID,
            cosmos_to_osmo_channel: COSMO_OSMO_CHANNEL.to_string(),
            osmo_to_cosmos_channel: OSMO_COSMO_CHANNEL.to_string(),
            poll_interval_secs: poll.interval.as_secs(),
            poll_timeout_secs: poll.timeout.as_secs(),
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl OsmosisSwapperConfig {
    /// Config with both endpoints replaced
    pub fn with_endpoints(osmo_url: impl Into<String>, cosmos_url: impl Into<String>) -> Self {
        Self {
            osmo_url: osmo_url.into(),
            cosmos_url: cosmos_url.into(),
            ..Default::default()
        }
    }

    /// Reads a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_swap_context(SwapErrorKind::Config, Phase::Config, || {
                format!("reading {}", path.display())
            })?;
        let config: Self = serde_json::from_str(&raw)
            .with_swap_context(SwapErrorKind::Config, Phase::Config, || {
                format!("parsing {}", path.display())
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .swap_context(SwapErrorKind::Config, Phase::Config)?;
        std::fs::write(path.as_ref(), json).swap_context(SwapErrorKind::Config, Phase::Config)
    }

    /// Defaults, then `.env`, then process environment overrides
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from any key/value source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_OSMO_URL) {
            self.osmo_url = url;
        }
        if let Some(url) = lookup(ENV_COSMOS_URL) {
            self.cosmos_url = url;
        }
        if let Some(secs) = lookup(ENV_POLL_INTERVAL_SECS) {
            self.poll_interval_secs = parse_secs(ENV_POLL_INTERVAL_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_POLL_TIMEOUT_SECS) {
            self.poll_timeout_secs = parse_secs(ENV_POLL_TIMEOUT_SECS, &secs)?;
        }
        Ok(())
    }

    /// Checks endpoints and poll bounds
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("osmo_url", &self.osmo_url), ("cosmos_url", &self.cosmos_url)] {
            let url = Url::parse(value)
                .map_err(|e| SwapError::config(format!("{name} '{value}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(SwapError::config(format!(
                    "{name} must be http(s), got '{}'",
                    url.scheme()
                )));
            }
        }
        if self.poll_interval_secs == 0 {
            return Err(SwapError::config("poll_interval_secs must be > 0"));
        }
        if self.poll_timeout_secs < self.poll_interval_secs {
            return Err(SwapError::config(
                "poll_timeout_secs must be at least poll_interval_secs",
            ));
        }
        if self.cosmos_to_osmo_channel.is_empty() || self.osmo_to_cosmos_channel.is_empty() {
            return Err(SwapError::config("IBC channels must not be empty"));
        }
        Ok(())
    }

    /// Settlement poll bounds
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::from_secs(self.poll_interval_secs, self.poll_timeout_secs)
    }

    /// HTTP settings for the Osmosis LCD
    pub fn osmosis_provider(&self) -> ProviderConfig {
        self.provider(&self.osmo_url)
    }

    /// HTTP settings for the Cosmos Hub LCD
    pub fn cosmos_provider(&self) -> ProviderConfig {
        self.provider(&self.cosmos_url)
    }

    fn provider(&self, url: &str) -> ProviderConfig {
        ProviderConfig::new(url)
            .with_timeout(self.request_timeout_secs)
            .with_max_retries(self.max_retries)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| SwapError::config(format!("{key} must be whole seconds, got '{value}'")))
}
