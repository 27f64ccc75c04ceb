// src/config.rs
//! Tunables for the aggregation pipeline. Loaded from TOML with env-path
//! override; every field has a default so a missing file is fine.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/aggregator.toml";

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Items scoring at or below this are dropped when a job has keywords.
    pub relevance_threshold: f64,
    /// Lowercased-title prefix length used for duplicate detection.
    pub dedup_prefix_chars: usize,
    /// Maximum articles retained in the shared store.
    pub store_cap: usize,
    /// Scheduler tick cadence.
    pub tick_secs: u64,
    /// Per-request timeout for upstream HTTP calls.
    pub request_timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.2,
            dedup_prefix_chars: 50,
            store_cap: 1000,
            tick_secs: 3600,
            request_timeout_secs: 12,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    relevance_threshold: Option<f64>,
    dedup_prefix_chars: Option<usize>,
    store_cap: Option<usize>,
    tick_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl AggregatorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading aggregator config from {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        let defaults = Self::default();
        Ok(Self {
            relevance_threshold: file
                .relevance_threshold
                .map(|v| v.clamp(0.0, 1.0))
                .unwrap_or(defaults.relevance_threshold),
            dedup_prefix_chars: file.dedup_prefix_chars.unwrap_or(defaults.dedup_prefix_chars),
            store_cap: file.store_cap.unwrap_or(defaults.store_cap),
            tick_secs: file.tick_secs.unwrap_or(defaults.tick_secs),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        })
    }

    /// Resolution order:
    /// 1) $AGGREGATOR_CONFIG_PATH (must exist if set)
    /// 2) config/aggregator.toml if present
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::from_file(&pb);
            }
            return Err(anyhow!("AGGREGATOR_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::from_file(&default_p);
        }
        Ok(Self::default())
    }
}
