// src/ingest/providers/reddit.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, send_for_text};
use crate::ingest::config::RedditConfig;
use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, FetchError, SearchQuery, SourceFetcher, SourceKind};

const NAME: &str = "reddit";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    created_utc: Option<f64>,
}

/// Reddit site-wide search (OAuth). Posts map to `Social` items; karma is kept as `raw_score`.
pub struct RedditFetcher {
    mode: Mode,
    limit: usize,
    timeout: Duration,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        cfg: RedditConfig,
    },
}

impl RedditFetcher {
    pub fn from_config(cfg: &RedditConfig) -> anyhow::Result<Self> {
        Ok(Self {
            mode: Mode::Http {
                client: build_client(cfg.timeout())?,
                cfg: cfg.clone(),
            },
            limit: cfg.limit,
            timeout: cfg.timeout(),
        })
    }

    pub fn from_fixture(json: &str) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
            limit: 100,
            timeout: Duration::from_secs(10),
        }
    }

    fn parse(body: &str, limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        let listing: Listing = serde_json::from_str(body).map_err(|e| FetchError::parse(NAME, e))?;

        let out = listing
            .data
            .children
            .into_iter()
            .filter_map(|c| {
                let p = c.data;
                let title = normalize_text(p.title.as_deref().unwrap_or_default());
                if title.is_empty() {
                    return None;
                }
                Some(ContentItem {
                    title,
                    description: p
                        .selftext
                        .as_deref()
                        .map(normalize_text)
                        .filter(|s| !s.is_empty()),
                    url: p.permalink.map(|l| format!("https://reddit.com{l}")),
                    source: SourceKind::Social,
                    raw_score: p.score,
                    provider: NAME.to_string(),
                    published_at: p
                        .created_utc
                        .filter(|t| t.is_finite() && *t >= 0.0)
                        .map(|t| t as u64),
                })
            })
            .take(limit)
            .collect();
        Ok(out)
    }
}

#[async_trait]
impl SourceFetcher for RedditFetcher {
    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse(s, limit),
            Mode::Http { client, cfg } => {
                let token = cfg.resolved_token().ok_or(FetchError::NotConfigured {
                    provider: NAME,
                    what: "oauth token",
                })?;
                let cap = limit.clamp(1, 100).to_string();
                let req = client
                    .get(&cfg.endpoint)
                    .bearer_auth(token)
                    .header(reqwest::header::USER_AGENT, cfg.user_agent.as_str())
                    .query(&[
                        ("q", query.text().as_str()),
                        ("sort", "relevance"),
                        ("limit", cap.as_str()),
                    ]);
                let body = send_for_text(NAME, req).await?;
                Self::parse(&body, limit)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
