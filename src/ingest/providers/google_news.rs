// src/ingest/providers/google_news.rs
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::{build_client, send_for_text};
use crate::ingest::config::GoogleNewsConfig;
use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, FetchError, SearchQuery, SourceFetcher, SourceKind};

const NAME: &str = "google_news";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<u64> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

/// Keyless news search over the Google News RSS feed.
pub struct GoogleNewsFetcher {
    mode: Mode,
    limit: usize,
    timeout: Duration,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        cfg: GoogleNewsConfig,
    },
}

impl GoogleNewsFetcher {
    pub fn from_config(cfg: &GoogleNewsConfig) -> anyhow::Result<Self> {
        Ok(Self {
            mode: Mode::Http {
                client: build_client(cfg.timeout())?,
                cfg: cfg.clone(),
            },
            limit: cfg.limit,
            timeout: cfg.timeout(),
        })
    }

    pub fn from_fixture(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
            limit: 100,
            timeout: Duration::from_secs(10),
        }
    }

    fn parse(xml: &str, limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean).map_err(|e| FetchError::parse(NAME, e))?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(limit));
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let description = it
                .description
                .as_deref()
                .map(normalize_text)
                // The feed often repeats the headline as the description.
                .filter(|d| !d.is_empty() && !d.starts_with(&title));
            out.push(ContentItem {
                title,
                description,
                url: it.link,
                source: SourceKind::News,
                raw_score: None,
                provider: NAME.to_string(),
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822_to_unix),
            });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceFetcher for GoogleNewsFetcher {
    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse(s, limit),
            Mode::Http { client, cfg } => {
                let url = if cfg.locale.is_empty() {
                    cfg.endpoint.clone()
                } else {
                    format!("{}?{}", cfg.endpoint, cfg.locale)
                };
                let req = client.get(url).query(&[("q", query.text())]);
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

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
