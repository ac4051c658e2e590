//! Environment-driven configuration with sensible defaults.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Stooq quote endpoint.
    pub stooq_base_url: String,
    /// Request-level timeout for one fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Staleness bound for the fetch cache, in seconds.
    pub cache_ttl_secs: u64,
    /// Trailing window the trend model fits on.
    pub prediction_lookback: usize,
    /// Fewest points the trend model accepts.
    pub min_fit_points: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stooq_base_url: "https://stooq.com".to_string(),
            fetch_timeout_secs: 10,
            cache_ttl_secs: 300,
            prediction_lookback: 30,
            min_fit_points: 10,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment, falling back to defaults.
    /// A variable that is present but unparseable is an error, never a
    /// silent fallback.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let stooq_base_url =
            env::var("STOOQ_BASE_URL").unwrap_or(defaults.stooq_base_url);

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.fetch_timeout_secs.to_string())
            .parse::<u64>()
            .context("Failed to parse FETCH_TIMEOUT_SECS")?;

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| defaults.cache_ttl_secs.to_string())
            .parse::<u64>()
            .context("Failed to parse CACHE_TTL_SECS")?;

        let prediction_lookback = env::var("PREDICTION_LOOKBACK")
            .unwrap_or_else(|_| defaults.prediction_lookback.to_string())
            .parse::<usize>()
            .context("Failed to parse PREDICTION_LOOKBACK")?;

        let min_fit_points = env::var("MIN_FIT_POINTS")
            .unwrap_or_else(|_| defaults.min_fit_points.to_string())
            .parse::<usize>()
            .context("Failed to parse MIN_FIT_POINTS")?;

        Ok(Self {
            stooq_base_url,
            fetch_timeout_secs,
            cache_ttl_secs,
            prediction_lookback,
            min_fit_points,
        })
    }
}
