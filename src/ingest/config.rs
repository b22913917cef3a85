// src/ingest/config.rs
//! Per-provider settings. Secrets may be written as `"ENV"`, meaning "read the
//! provider's environment variable" (`NEWS_API_KEY`, `REDDIT_TOKEN`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_REDDIT_TOKEN: &str = "REDDIT_TOKEN";
/// Upper bound for `NewsApiConfig::lookback_days`.
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// Resolve a configured secret. `"ENV"` (any case) reads `env_name`; empty means unset.
pub fn resolve_secret(raw: &str, env_name: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("env") {
        return std::env::var(env_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn env_marker() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub newsapi: NewsApiConfig,
    pub reddit: RedditConfig,
    pub google_news: GoogleNewsConfig,
    pub playstore: PlayStoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub limit: usize,
    pub timeout_secs: u64,
    /// Only articles newer than this many days, within `0..=MAX_LOOKBACK_DAYS`.
    pub lookback_days: i64,
    pub language: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            api_key: env_marker(),
            limit: 100,
            timeout_secs: 10,
            lookback_days: 7,
            language: "en".to_string(),
        }
    }
}

impl NewsApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn resolved_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, ENV_NEWS_API_KEY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// OAuth bearer token.
    pub token: String,
    pub user_agent: String,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://oauth.reddit.com/search.json".to_string(),
            token: env_marker(),
            user_agent: "platform-sentiment/0.1".to_string(),
            limit: 100,
            timeout_secs: 10,
        }
    }
}

impl RedditConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn resolved_token(&self) -> Option<String> {
        resolve_secret(&self.token, ENV_REDDIT_TOKEN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleNewsConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// `hl`/`gl`/`ceid` query suffix.
    pub locale: String,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for GoogleNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://news.google.com/rss/search".to_string(),
            locale: "hl=en-US&gl=US&ceid=US:en".to_string(),
            limit: 100,
            timeout_secs: 10,
        }
    }
}

impl GoogleNewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayStoreConfig {
    pub enabled: bool,
    /// Review feed returning `{ "data": [ { "text", "score", ... } ] }`.
    pub endpoint: String,
    pub sort: String,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for PlayStoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://127.0.0.1:3100/reviews".to_string(),
            sort: "relevance".to_string(),
            limit: 100,
            // Review scraping is the slow path.
            timeout_secs: 120,
        }
    }
}

impl PlayStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_marker_reads_variable() {
        std::env::set_var(ENV_NEWS_API_KEY, " abc123 ");
        assert_eq!(
            resolve_secret("ENV", ENV_NEWS_API_KEY).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            resolve_secret("env", ENV_NEWS_API_KEY).as_deref(),
            Some("abc123")
        );
        std::env::remove_var(ENV_NEWS_API_KEY);
        assert_eq!(resolve_secret("ENV", ENV_NEWS_API_KEY), None);
    }

    #[test]
    fn literal_and_empty_secrets() {
        assert_eq!(resolve_secret("k-1", "UNUSED").as_deref(), Some("k-1"));
        assert_eq!(resolve_secret("  ", "UNUSED"), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: SourcesConfig = toml::from_str(
            r#"
[newsapi]
limit = 20

[playstore]
enabled = false
"#,
        )
        .unwrap();
        assert_eq!(cfg.newsapi.limit, 20);
        assert_eq!(cfg.newsapi.lookback_days, 7);
        assert!(!cfg.playstore.enabled);
        assert!(cfg.reddit.enabled);
        assert_eq!(cfg.playstore.timeout(), Duration::from_secs(120));
    }
}
