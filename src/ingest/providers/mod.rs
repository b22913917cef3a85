// src/ingest/providers/mod.rs
pub mod google_news;
pub mod newsapi;
pub mod playstore;
pub mod reddit;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::ingest::types::FetchError;

const USER_AGENT: &str = "platform-sentiment/0.1";

/// Client shared by one fetcher. The per-request bound is also enforced by `fetch_all`.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()
        .context("building provider http client")
}

/// Send `req`, reject non-2xx, return the body.
pub(crate) async fn send_for_text(
    provider: &'static str,
    req: reqwest::RequestBuilder,
) -> Result<String, FetchError> {
    let resp = req
        .send()
        .await
        .map_err(|source| FetchError::Http { provider, source })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    resp.text()
        .await
        .map_err(|source| FetchError::Http { provider, source })
}

/// RFC 3339 timestamp to unix seconds; unparsable or pre-epoch values become `None`.
pub(crate) fn parse_rfc3339_to_unix(ts: &str) -> Option<u64> {
    chrono::DateTime::parse_from_rfc3339(ts)
        .ok()
        .and_then(|dt| u64::try_from(dt.timestamp()).ok())
}
