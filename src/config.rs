//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable overrides for the store capacities.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::window::EvictionMode;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let mut config = Config::default();
                config.apply_env_overrides()?;
                Ok(config)
            }
        }
    }

    /// Capacity overrides from `TRACKER_MAX_INSTRUMENTS` and `TRACKER_WINDOW_CAPACITY`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("TRACKER_MAX_INSTRUMENTS") {
            self.store.max_instruments = value
                .parse()
                .with_context(|| format!("TRACKER_MAX_INSTRUMENTS is not a count: {value}"))?;
        }
        if let Ok(value) = std::env::var("TRACKER_WINDOW_CAPACITY") {
            self.store.window_capacity = value
                .parse()
                .with_context(|| format!("TRACKER_WINDOW_CAPACITY is not a count: {value}"))?;
        }
        Ok(())
    }
}

/// Fixed capacities of the store, decided once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Hard ceiling on registered instruments
    pub max_instruments: usize,
    /// Trailing samples kept per instrument
    pub window_capacity: usize,
    pub hash_buckets: usize,
    /// Alert thresholds sit this fraction above and below the reference price
    pub alert_band: f64,
    #[serde(default)]
    pub eviction: EvictionMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_instruments: 100,
            window_capacity: 100,
            hash_buckets: 50,
            alert_band: 0.10, // ±10%
            eviction: EvictionMode::Exact,
        }
    }
}

impl StoreConfig {
    pub fn with_max_instruments(mut self, max: usize) -> Self {
        self.max_instruments = max;
        self
    }

    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity;
        self
    }

    pub fn with_hash_buckets(mut self, buckets: usize) -> Self {
        self.hash_buckets = buckets;
        self
    }

    pub fn with_alert_band(mut self, band: f64) -> Self {
        self.alert_band = band;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionMode) -> Self {
        self.eviction = eviction;
        self
    }
}

/// Indicator periods and RSI signal thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            sma_period: 5,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Line protocol settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Entries returned by `TRANSACTIONS`
    pub transaction_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            transaction_limit: 50,
        }
    }
}
