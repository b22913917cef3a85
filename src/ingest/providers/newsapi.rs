// src/ingest/providers/newsapi.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, parse_rfc3339_to_unix, send_for_text};
use crate::ingest::config::{NewsApiConfig, MAX_LOOKBACK_DAYS};
use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, FetchError, SearchQuery, SourceFetcher, SourceKind};

const NAME: &str = "newsapi";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// NewsAPI `everything` search. Boolean syntax is supported upstream, so a
/// location is rendered as `subject AND (location)`.
pub struct NewsApiFetcher {
    mode: Mode,
    limit: usize,
    timeout: Duration,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        cfg: NewsApiConfig,
    },
}

impl NewsApiFetcher {
    pub fn from_config(cfg: &NewsApiConfig) -> anyhow::Result<Self> {
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

    pub fn render_query(query: &SearchQuery) -> String {
        match query.location.as_deref().map(str::trim) {
            Some(loc) if !loc.is_empty() => format!("{} AND ({})", query.subject, loc),
            _ => query.subject.clone(),
        }
    }

    fn parse(body: &str, limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        let resp: NewsApiResponse =
            serde_json::from_str(body).map_err(|e| FetchError::parse(NAME, e))?;
        if resp.status != "ok" {
            return Err(FetchError::parse(
                NAME,
                format!(
                    "status '{}': {}",
                    resp.status,
                    resp.message.unwrap_or_default()
                ),
            ));
        }

        let mut out = Vec::with_capacity(resp.articles.len().min(limit));
        for a in resp.articles {
            let title = normalize_text(a.title.as_deref().unwrap_or_default());
            // NewsAPI blanks out taken-down articles.
            if title.is_empty() || title == "[Removed]" {
                continue;
            }
            out.push(ContentItem {
                title,
                description: a
                    .description
                    .as_deref()
                    .map(normalize_text)
                    .filter(|d| !d.is_empty()),
                url: a.url,
                source: SourceKind::News,
                raw_score: None,
                provider: NAME.to_string(),
                published_at: a.published_at.as_deref().and_then(parse_rfc3339_to_unix),
            });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }
}

/// `from` date for the query: `now - days`, with `days` held to `0..=MAX_LOOKBACK_DAYS`.
fn lookback_start(now: chrono::DateTime<chrono::Utc>, days: i64) -> String {
    let days = chrono::Duration::days(days.clamp(0, MAX_LOOKBACK_DAYS));
    (now - days).format("%Y-%m-%d").to_string()
}

#[async_trait]
impl SourceFetcher for NewsApiFetcher {
    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse(s, limit),
            Mode::Http { client, cfg } => {
                let key = cfg.resolved_key().ok_or(FetchError::NotConfigured {
                    provider: NAME,
                    what: "api key",
                })?;
                let from = lookback_start(chrono::Utc::now(), cfg.lookback_days);
                let page_size = limit.clamp(1, 100).to_string();

                let req = client
                    .get(&cfg.endpoint)
                    .header("X-Api-Key", key)
                    .query(&[
                        ("q", Self::render_query(query).as_str()),
                        ("sortBy", "relevancy"),
                        ("pageSize", page_size.as_str()),
                        ("from", from.as_str()),
                        ("language", cfg.language.as_str()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_rendered_as_boolean_qualifier() {
        let q = SearchQuery::with_location("Zomato", "Bangalore");
        assert_eq!(NewsApiFetcher::render_query(&q), "Zomato AND (Bangalore)");
        let q = SearchQuery::subject("Zomato");
        assert_eq!(NewsApiFetcher::render_query(&q), "Zomato");
    }

    #[test]
    fn lookback_start_stays_in_range() {
        use chrono::TimeZone;
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(lookback_start(now, 7), "2024-03-03");
        assert_eq!(lookback_start(now, -5), "2024-03-10");
        assert_eq!(lookback_start(now, i64::MAX), "2023-03-11");
    }

    #[test]
    fn error_status_is_a_parse_error() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"bad key"}"#;
        let err = NewsApiFetcher::parse(body, 10).unwrap_err();
        assert!(matches!(err, FetchError::Parse { provider: "newsapi", .. }));
    }

    #[test]
    fn removed_articles_are_skipped() {
        let body = r#"{"status":"ok","articles":[
            {"title":"[Removed]","description":"[Removed]","url":"https://removed.com"},
            {"title":"Kept","description":null,"url":"https://a.test/1"}
        ]}"#;
        let items = NewsApiFetcher::parse(body, 10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Kept");
        assert_eq!(items[0].description, None);
    }
}
