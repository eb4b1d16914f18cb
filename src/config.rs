//! Configuration for the dripfeed limiter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{DripfeedError, Result};

/// Configuration for a [`Limiter`](crate::limiter::Limiter).
///
/// The limiter admits one request per fill period once the burst
/// allowance is spent, and rejects requests whose scheduled wait would
/// reach `fill_period_ms * (max_wait_count - 1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Number of requests allowed to burst without delay.
    #[serde(default)]
    pub burst_limit: u32,

    /// One request is admitted per this many milliseconds. Must be positive.
    #[serde(default = "default_fill_period_ms")]
    pub fill_period_ms: u64,

    /// Maximum number of periods' worth of wait a caller may be asked to
    /// absorb before being rejected. 0 disables queuing entirely.
    #[serde(default = "default_max_wait_count")]
    pub max_wait_count: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            burst_limit: 0,
            fill_period_ms: default_fill_period_ms(),
            max_wait_count: default_max_wait_count(),
        }
    }
}

fn default_fill_period_ms() -> u64 {
    1000
}

fn default_max_wait_count() -> u32 {
    10
}

impl LimiterConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading limiter configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| DripfeedError::Config(format!("Failed to parse limiter config: {}", e)))
    }
}
