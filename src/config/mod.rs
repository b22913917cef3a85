// src/config/mod.rs
//! Application configuration.
//!
//! Lookup order:
//! 1) `$SENTIMENT_CONFIG_PATH` (must exist)
//! 2) `config/sentiment.toml`
//! 3) `config/sentiment.json`
//! 4) built-in defaults
//!
//! Every field has a default, so partial files are fine.

pub mod ai;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::{DEFAULT_FETCH_LIMIT, DEFAULT_TOP_K};
use crate::ingest::config::{SourcesConfig, MAX_LOOKBACK_DAYS};
use crate::sentiment::ScoreMode;
use ai::SummaryConfig;

pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_CATALOG_PATH: &str = "SENTIMENT_CATALOG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";
pub const DEFAULT_CATALOG_PATH: &str = "config/platforms.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub sources: SourcesConfig,
    pub summary: SummaryConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_k: usize,
    /// Per-fetcher item cap requested from providers.
    pub fetch_limit: usize,
    pub score_mode: ScoreMode,
    /// Near-duplicate similarity threshold; 0 disables dedup.
    pub dedup_threshold: f64,
    pub neutral_band: f64,
    pub trend_window: usize,
    pub trend_threshold: f64,
    pub aspects: Vec<String>,
    pub location_aspects: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            score_mode: ScoreMode::Average,
            dedup_threshold: 0.0,
            neutral_band: 0.05,
            trend_window: 7,
            trend_threshold: 0.05,
            aspects: ["price", "features", "reliability", "support"]
                .map(String::from)
                .to_vec(),
            location_aspects: ["impact", "local_response", "public_opinion", "concerns"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CATALOG_PATH.to_string(),
        }
    }
}

impl CatalogConfig {
    /// `$SENTIMENT_CATALOG_PATH` wins over the configured path.
    pub fn resolved_path(&self) -> PathBuf {
        std::env::var(ENV_CATALOG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&self.path))
    }
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: AppConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing toml config {}", path.display()))?,
        };
        cfg.sanitized()
    }

    /// Env var, then conventional paths, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_CONFIG_PATH, "config/sentiment.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Self::default().sanitized()
    }

    fn sanitized(mut self) -> Result<Self> {
        let p = &mut self.pipeline;
        if p.top_k == 0 {
            p.top_k = DEFAULT_TOP_K;
        }
        if p.fetch_limit == 0 {
            p.fetch_limit = DEFAULT_FETCH_LIMIT;
        }
        if !(0.0..=1.0).contains(&p.dedup_threshold) {
            p.dedup_threshold = 0.0;
        }
        p.neutral_band = p.neutral_band.abs();
        p.trend_threshold = p.trend_threshold.abs();

        let news = &mut self.sources.newsapi;
        news.lookback_days = news.lookback_days.clamp(0, MAX_LOOKBACK_DAYS);

        self.summary = self.summary.normalized()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_load() {
        let dir = tempfile::tempdir().unwrap();

        let p_toml = dir.path().join("sentiment.toml");
        fs::write(
            &p_toml,
            r#"
[pipeline]
top_k = 3
score_mode = "sum"
dedup_threshold = 1.7

[sources.reddit]
enabled = false
"#,
        )
        .unwrap();
        let cfg = AppConfig::load_from(&p_toml).unwrap();
        assert_eq!(cfg.pipeline.top_k, 3);
        assert_eq!(cfg.pipeline.score_mode, ScoreMode::Sum);
        assert_eq!(cfg.pipeline.dedup_threshold, 0.0);
        assert!(!cfg.sources.reddit.enabled);
        assert_eq!(cfg.pipeline.trend_window, 7);

        let p_json = dir.path().join("sentiment.json");
        fs::write(&p_json, r#"{"pipeline":{"fetch_limit":0}}"#).unwrap();
        let cfg = AppConfig::load_from(&p_json).unwrap();
        assert_eq!(cfg.pipeline.fetch_limit, DEFAULT_FETCH_LIMIT);
    }

    #[test]
    fn lookback_days_clamped_to_a_year() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("sentiment.toml");

        fs::write(&p, "[sources.newsapi]\nlookback_days = 9223372036854775807\n").unwrap();
        let cfg = AppConfig::load_from(&p).unwrap();
        assert_eq!(cfg.sources.newsapi.lookback_days, MAX_LOOKBACK_DAYS);

        fs::write(&p, "[sources.newsapi]\nlookback_days = -30\n").unwrap();
        let cfg = AppConfig::load_from(&p).unwrap();
        assert_eq!(cfg.sources.newsapi.lookback_days, 0);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.pipeline.top_k, DEFAULT_TOP_K);

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "[pipeline]\ntop_k = 9\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        assert_eq!(AppConfig::load_default().unwrap().pipeline.top_k, 9);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(AppConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
