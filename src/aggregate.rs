//! # Aggregator
//! Fans out to fetchers, scores every item and reduces the batch into an
//! [`AggregateResult`]: overall sentiment (arithmetic mean) plus the top-K
//! items by absolute sentiment.
//!
//! The steps are also exposed on their own (`collect`, `score_batch`,
//! `reduce`) so the pipeline can insert dedup and insights between them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ingest::types::{ContentItem, SearchQuery, SourceFetcher};
use crate::ingest::{self, FetchOutcome};
use crate::sentiment::TextScorer;

/// Error text carried by an aggregate built from an empty batch.
pub const EMPTY_BATCH_ERROR: &str = "Failed to fetch data";
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// A content item with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub overall_sentiment: f64,
    pub top_items: Vec<ScoredItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub item_count: usize,
    /// Providers that failed or timed out for this request.
    #[serde(default)]
    pub failed_sources: Vec<String>,
    /// Scored items per provider; sums to `item_count`.
    #[serde(default)]
    pub source_counts: BTreeMap<String, usize>,
}

impl AggregateResult {
    /// Neutral result flagged with `error`.
    pub fn degraded(error: impl Into<String>, failed_sources: Vec<String>) -> Self {
        Self {
            overall_sentiment: 0.0,
            top_items: Vec::new(),
            error: Some(error.into()),
            item_count: 0,
            failed_sources,
            source_counts: BTreeMap::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Clone)]
pub struct Aggregator {
    scorer: Arc<dyn TextScorer>,
    top_k: usize,
    fetch_limit: usize,
}

impl Aggregator {
    pub fn new(scorer: Arc<dyn TextScorer>) -> Self {
        Self {
            scorer,
            top_k: DEFAULT_TOP_K,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn scorer(&self) -> &Arc<dyn TextScorer> {
        &self.scorer
    }

    /// Fetch + score + reduce.
    pub async fn aggregate(
        &self,
        query: &SearchQuery,
        fetchers: &[Arc<dyn SourceFetcher>],
    ) -> AggregateResult {
        let FetchOutcome { items, failed } = self.collect(query, fetchers).await;
        let scored = self.score_batch(items);
        self.reduce(&scored, failed)
    }

    /// Settle-all fan-out; see [`ingest::fetch_all`].
    pub async fn collect(
        &self,
        query: &SearchQuery,
        fetchers: &[Arc<dyn SourceFetcher>],
    ) -> FetchOutcome {
        ingest::fetch_all(fetchers, query, self.fetch_limit).await
    }

    /// `sentiment = score(title + " " + description)`, order preserved.
    pub fn score_batch(&self, items: Vec<ContentItem>) -> Vec<ScoredItem> {
        items
            .into_iter()
            .map(|item| {
                let sentiment = self.scorer.score(&item.scoring_text());
                ScoredItem { item, sentiment }
            })
            .collect()
    }

    /// Mean + top-K. An empty batch yields the degraded result.
    pub fn reduce(&self, batch: &[ScoredItem], failed_sources: Vec<String>) -> AggregateResult {
        if batch.is_empty() {
            return AggregateResult::degraded(EMPTY_BATCH_ERROR, failed_sources);
        }

        AggregateResult {
            overall_sentiment: mean(batch.iter().map(|s| s.sentiment)),
            top_items: top_by_impact(batch, self.top_k),
            error: None,
            item_count: batch.len(),
            failed_sources,
            source_counts: count_by_provider(batch),
        }
    }
}

/// Item count per provider name.
pub fn count_by_provider(batch: &[ScoredItem]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for s in batch {
        *counts.entry(s.item.provider.clone()).or_insert(0) += 1;
    }
    counts
}

/// Arithmetic mean; 0 for an empty iterator.
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Stable sort by `|sentiment|` descending, truncated to `k`. Ties keep batch order.
pub fn top_by_impact(batch: &[ScoredItem], k: usize) -> Vec<ScoredItem> {
    let mut ranked: Vec<&ScoredItem> = batch.iter().collect();
    ranked.sort_by(|a, b| b.sentiment.abs().total_cmp(&a.sentiment.abs()));
    ranked.into_iter().take(k).cloned().collect()
}
