// src/ingest/providers/playstore.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, parse_rfc3339_to_unix, send_for_text};
use crate::ingest::config::PlayStoreConfig;
use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, FetchError, SearchQuery, SourceFetcher, SourceKind};

const NAME: &str = "playstore";

/// The review feed answers either `{ "data": [...] }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { data: Vec<Review> },
    Bare(Vec<Review>),
}

#[derive(Debug, Deserialize)]
struct Review {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "content")]
    text: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// App-store reviews for one app id. The query subject is the app id; any
/// location is ignored. Review `text` becomes the item description and the
/// star rating becomes `raw_score`.
pub struct PlayStoreFetcher {
    mode: Mode,
    limit: usize,
    timeout: Duration,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        cfg: PlayStoreConfig,
    },
}

impl PlayStoreFetcher {
    pub fn from_config(cfg: &PlayStoreConfig) -> anyhow::Result<Self> {
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
        let payload: Payload = serde_json::from_str(body).map_err(|e| FetchError::parse(NAME, e))?;
        let reviews = match payload {
            Payload::Wrapped { data } => data,
            Payload::Bare(v) => v,
        };

        let out = reviews
            .into_iter()
            .filter_map(|r| {
                let text = normalize_text(r.text.as_deref().unwrap_or_default());
                if text.is_empty() {
                    return None;
                }
                Some(ContentItem {
                    title: r.title.as_deref().map(normalize_text).unwrap_or_default(),
                    description: Some(text),
                    url: r.url,
                    source: SourceKind::Review,
                    raw_score: r.score,
                    provider: NAME.to_string(),
                    published_at: r.date.as_deref().and_then(parse_rfc3339_to_unix),
                })
            })
            .take(limit)
            .collect();
        Ok(out)
    }
}

#[async_trait]
impl SourceFetcher for PlayStoreFetcher {
    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse(s, limit),
            Mode::Http { client, cfg } => {
                let num = limit.max(1).to_string();
                let req = client.get(&cfg.endpoint).query(&[
                    ("appId", query.subject.as_str()),
                    ("num", num.as_str()),
                    ("sort", cfg.sort.as_str()),
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
