// src/ingest/mod.rs
pub mod config;
pub mod dedup;
pub mod providers;
pub mod types;

use crate::ingest::types::{ContentItem, FetchError, SearchQuery, SourceFetcher};
use futures::future::join_all;
use futures::FutureExt;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_items_total", "Items returned by providers.");
        describe_counter!(
            "fetch_errors_total",
            "Provider fetch/parse/timeout errors."
        );
        describe_histogram!("fetch_duration_ms", "Provider fetch time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, strip stray punctuation.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Strip trailing commas/ellipsis dots left by truncated feeds
    while let Some(last) = out.chars().last() {
        if matches!(last, ',' | '…') {
            out.pop();
        } else {
            break;
        }
    }

    // 6) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Items from every fetcher that settled successfully, plus the names of those that did not.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<ContentItem>,
    pub failed: Vec<String>,
}

/// Run all fetchers concurrently and wait for every one to settle.
///
/// Each call is bounded by the fetcher's own timeout. A failed, timed-out or
/// panicking fetcher contributes no items and is listed in `failed`; it never
/// cancels its siblings. Items keep fetcher order, then provider order.
pub async fn fetch_all(
    fetchers: &[Arc<dyn SourceFetcher>],
    query: &SearchQuery,
    limit: usize,
) -> FetchOutcome {
    ensure_metrics_described();

    let calls = fetchers.iter().map(|fetcher| {
        let fetcher = Arc::clone(fetcher);
        async move {
            let name = fetcher.name();
            let cap = limit.min(fetcher.limit());
            let budget = fetcher.timeout();
            let t0 = Instant::now();

            // A panic stays inside this call so the join still settles.
            let call = AssertUnwindSafe(fetcher.fetch(query, cap)).catch_unwind();
            let res = match tokio::time::timeout(budget, call).await {
                Ok(Ok(res)) => res,
                Ok(Err(_)) => Err(FetchError::Panicked { provider: name }),
                Err(_) => Err(FetchError::Timeout {
                    provider: name,
                    after_ms: budget.as_millis() as u64,
                }),
            };

            let ms = t0.elapsed().as_secs_f64() * 1_000.0;
            histogram!("fetch_duration_ms", "provider" => name).record(ms);

            (name, res.map(|mut items| {
                items.truncate(cap);
                items
            }))
        }
    });

    let mut out = FetchOutcome::default();
    for (name, res) in join_all(calls).await {
        match res {
            Ok(mut items) => {
                tracing::debug!(provider = name, count = items.len(), "provider ok");
                counter!("fetch_items_total", "provider" => name).increment(items.len() as u64);
                out.items.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(error = %e, provider = name, "provider error");
                counter!("fetch_errors_total", "provider" => name).increment(1);
                out.failed.push(name.to_string());
            }
        }
    }
    out
}
