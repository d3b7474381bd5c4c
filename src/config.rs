//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::features::IntelFeatures;
use crate::tasks::DEFAULT_CLEANUP_INTERVAL;

pub const DEFAULT_OPENSKY_BASE_URL: &str = "https://opensky-network.org/api";
pub const DEFAULT_CELESTRAK_BASE_URL: &str = "https://celestrak.org";
pub const DEFAULT_USGS_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0";
pub const DEFAULT_SWPC_BASE_URL: &str = "https://services.swpc.noaa.gov";

/// Upstream API roots, overridable so tests can point at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    pub opensky: String,
    pub celestrak: String,
    pub usgs: String,
    pub swpc: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            opensky: DEFAULT_OPENSKY_BASE_URL.to_string(),
            celestrak: DEFAULT_CELESTRAK_BASE_URL.to_string(),
            usgs: DEFAULT_USGS_BASE_URL.to_string(),
            swpc: DEFAULT_SWPC_BASE_URL.to_string(),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Interval between cache sweeps in seconds
    pub cleanup_interval: u64,
    /// Upstream fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
    pub upstream: UpstreamUrls,
    pub features: IntelFeatures,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `FETCH_TIMEOUT_MS` - Upstream timeout in milliseconds (default: 10000)
    /// - `OPENSKY_BASE_URL`, `CELESTRAK_BASE_URL`, `USGS_BASE_URL`,
    ///   `SWPC_BASE_URL` - upstream API roots
    /// - `PUBLIC_FEATURE_*` - intel source flags, see [`IntelFeatures`]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            fetch_timeout_ms: parse_env::<u64>("FETCH_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.fetch_timeout_ms),
            upstream: UpstreamUrls {
                opensky: env::var("OPENSKY_BASE_URL").unwrap_or(defaults.upstream.opensky),
                celestrak: env::var("CELESTRAK_BASE_URL").unwrap_or(defaults.upstream.celestrak),
                usgs: env::var("USGS_BASE_URL").unwrap_or(defaults.upstream.usgs),
                swpc: env::var("SWPC_BASE_URL").unwrap_or(defaults.upstream.swpc),
            },
            features: IntelFeatures::from_env(),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL.as_secs(),
            fetch_timeout_ms: 10_000,
            upstream: UpstreamUrls::default(),
            features: IntelFeatures::default(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
