// src/ingest/types.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider family a content item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    News,
    Social,
    Review,
}

/// One fetched unit of text (article, post, review). Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub source: SourceKind,
    /// Provider-side score, e.g. a star rating or post karma.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
    pub provider: String, // e.g. "newsapi", "reddit"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<u64>, // unix seconds
}

impl ContentItem {
    pub fn new(source: SourceKind, provider: &str, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            url: None,
            source,
            raw_score: None,
            provider: provider.to_string(),
            published_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_raw_score(mut self, score: f64) -> Self {
        self.raw_score = Some(score);
        self
    }

    /// `title + " " + description`, a missing description read as "".
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or_default())
    }
}

/// What to search for. `location` narrows the search to a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub subject: String,
    pub location: Option<String>,
}

impl SearchQuery {
    pub fn subject(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            location: None,
        }
    }

    pub fn with_location(subject: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            location: Some(location.into()),
        }
    }

    /// Plain-text rendering: `"{subject} {location}"`.
    pub fn text(&self) -> String {
        match self.location.as_deref() {
            Some(loc) if !loc.trim().is_empty() => format!("{} {}", self.subject, loc),
            _ => self.subject.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{provider}: request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider}: upstream returned status {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider}: malformed payload: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider}: timed out after {after_ms}ms")]
    Timeout { provider: &'static str, after_ms: u64 },
    #[error("{provider}: not configured ({what})")]
    NotConfigured {
        provider: &'static str,
        what: &'static str,
    },
    #[error("{provider}: fetch panicked")]
    Panicked { provider: &'static str },
}

impl FetchError {
    pub fn parse(provider: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            provider,
            reason: err.to_string(),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Self::Http { provider, .. }
            | Self::Status { provider, .. }
            | Self::Parse { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::NotConfigured { provider, .. }
            | Self::Panicked { provider } => provider,
        }
    }
}

/// One provider of content items.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, query: &SearchQuery, limit: usize)
        -> Result<Vec<ContentItem>, FetchError>;

    fn name(&self) -> &'static str;

    /// Cap applied when the caller does not ask for fewer.
    fn limit(&self) -> usize {
        100
    }

    /// Upper bound on one `fetch` call.
    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(10)
    }
}
