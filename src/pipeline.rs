//! # Pipeline
//! The three inbound analysis operations wired end to end:
//! fetch (settle-all) → optional near-duplicate filter → score → reduce →
//! insights → optional summary.
//!
//! Holds only immutable state and is shared across requests as `Arc<Pipeline>`.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aggregate::{top_by_impact, AggregateResult, Aggregator};
use crate::catalog::Platform;
use crate::config::{AppConfig, PipelineConfig};
use crate::ingest::dedup::dedup_near_duplicates;
use crate::ingest::providers::{
    google_news::GoogleNewsFetcher, newsapi::NewsApiFetcher, playstore::PlayStoreFetcher,
    reddit::RedditFetcher,
};
use crate::ingest::types::{SearchQuery, SourceFetcher};
use crate::ingest::FetchOutcome;
use crate::insights::{self, InsightParams, Insights, SentimentLabel, Trend};
use crate::sentiment::{LexiconScorer, TextScorer};
use crate::summary::{build_summarizer, DisabledSummarizer, DynSummarizer};

pub const PRODUCT_REQUIRED: &str = "Product name is required";
pub const LOCATION_REQUIRED: &str = "Location is required";
pub const APP_REQUIRED: &str = "App name is required";
/// Error carried by a result whose analysis task crashed.
pub const ANALYSIS_FAILED_ERROR: &str = "Failed to analyze sentiment";
pub const NO_APP_ERROR: &str = "No app listed for this platform";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(&'static str),
}

/// One analysis: the aggregate plus derived views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub aggregate: AggregateResult,
    pub insights: Insights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisReport {
    /// Neutral report flagged with `error`, nothing fetched.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            aggregate: AggregateResult::degraded(error, Vec::new()),
            insights: Insights {
                label: SentimentLabel::Neutral,
                trend: Trend::insufficient(),
                aspects: BTreeMap::new(),
            },
            summary: None,
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analyses_total", "Analyses started, by operation.");
        describe_counter!(
            "analyses_degraded_total",
            "Analyses that ended with an error result."
        );
    });
}

pub struct Pipeline {
    cfg: PipelineConfig,
    aggregator: Aggregator,
    news: Vec<Arc<dyn SourceFetcher>>,
    reviews: Vec<Arc<dyn SourceFetcher>>,
    summarizer: DynSummarizer,
    summary_items: usize,
}

impl Pipeline {
    /// Empty fetcher sets and no summary. Add fetchers with the `with_*` builders.
    pub fn new(cfg: PipelineConfig, scorer: Arc<dyn TextScorer>) -> Self {
        let aggregator = Aggregator::new(scorer)
            .with_top_k(cfg.top_k)
            .with_fetch_limit(cfg.fetch_limit);
        Self {
            cfg,
            aggregator,
            news: Vec::new(),
            reviews: Vec::new(),
            summarizer: Arc::new(DisabledSummarizer),
            summary_items: 10,
        }
    }

    pub fn with_news_fetcher(mut self, f: Arc<dyn SourceFetcher>) -> Self {
        self.news.push(f);
        self
    }

    pub fn with_review_fetcher(mut self, f: Arc<dyn SourceFetcher>) -> Self {
        self.reviews.push(f);
        self
    }

    pub fn with_summarizer(mut self, s: DynSummarizer, max_items: usize) -> Self {
        self.summarizer = s;
        self.summary_items = max_items.max(1);
        self
    }

    /// Lexicon scorer, every enabled provider, configured summarizer.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let scorer = Arc::new(LexiconScorer::new(cfg.pipeline.score_mode));
        let mut p = Self::new(cfg.pipeline.clone(), scorer)
            .with_summarizer(build_summarizer(&cfg.summary), cfg.summary.max_items);

        let src = &cfg.sources;
        if src.newsapi.enabled {
            p = p.with_news_fetcher(Arc::new(NewsApiFetcher::from_config(&src.newsapi)?));
        }
        if src.reddit.enabled {
            p = p.with_news_fetcher(Arc::new(RedditFetcher::from_config(&src.reddit)?));
        }
        if src.google_news.enabled {
            p = p.with_news_fetcher(Arc::new(GoogleNewsFetcher::from_config(&src.google_news)?));
        }
        if src.playstore.enabled {
            p = p.with_review_fetcher(Arc::new(PlayStoreFetcher::from_config(&src.playstore)?));
        }

        if p.news.is_empty() {
            warn!("no news providers enabled; analyses will come back degraded");
        }
        info!(
            news = p.news.len(),
            reviews = p.reviews.len(),
            summarizer = p.summarizer.provider_name(),
            "pipeline ready"
        );
        Ok(p)
    }

    pub fn news_providers(&self) -> Vec<&'static str> {
        self.news.iter().map(|f| f.name()).collect()
    }

    pub fn review_providers(&self) -> Vec<&'static str> {
        self.reviews.iter().map(|f| f.name()).collect()
    }

    /// News + social sentiment for a subject.
    pub async fn analyze(&self, subject: &str) -> Result<AnalysisReport, PipelineError> {
        let subject = non_blank(subject, PRODUCT_REQUIRED)?;
        let query = SearchQuery::subject(subject);
        Ok(self
            .run("normal", &query, &self.news, &self.cfg.aspects)
            .await)
    }

    /// Same as [`Pipeline::analyze`], narrowed to a place.
    pub async fn analyze_with_location(
        &self,
        subject: &str,
        location: &str,
    ) -> Result<AnalysisReport, PipelineError> {
        let subject = non_blank(subject, PRODUCT_REQUIRED)?;
        let location = non_blank(location, LOCATION_REQUIRED)?;
        let query = SearchQuery::with_location(subject, location);
        Ok(self
            .run("location", &query, &self.news, &self.cfg.location_aspects)
            .await)
    }

    /// Play Store review sentiment for an app id.
    pub async fn analyze_app_reviews(&self, app_id: &str) -> Result<AnalysisReport, PipelineError> {
        let app_id = non_blank(app_id, APP_REQUIRED)?;
        let query = SearchQuery::subject(app_id);
        Ok(self
            .run("reviews", &query, &self.reviews, &self.cfg.aspects)
            .await)
    }

    /// News (by name) and reviews (by app id) for a catalog platform, run concurrently.
    pub async fn platform_report(&self, platform: &Platform) -> (AnalysisReport, AnalysisReport) {
        let news = async {
            self.analyze(&platform.name)
                .await
                .unwrap_or_else(|e| AnalysisReport::degraded(e.to_string()))
        };
        let reviews = async {
            match platform.app_id.as_deref() {
                Some(app) if !app.trim().is_empty() => self
                    .analyze_app_reviews(app)
                    .await
                    .unwrap_or_else(|e| AnalysisReport::degraded(e.to_string())),
                _ => AnalysisReport::degraded(NO_APP_ERROR),
            }
        };
        tokio::join!(news, reviews)
    }

    async fn run(
        &self,
        kind: &'static str,
        query: &SearchQuery,
        fetchers: &[Arc<dyn SourceFetcher>],
        aspects: &[String],
    ) -> AnalysisReport {
        ensure_metrics_described();
        counter!("analyses_total", "kind" => kind).increment(1);

        let FetchOutcome { items, failed } = self.aggregator.collect(query, fetchers).await;
        let (items, dropped) = dedup_near_duplicates(items, self.cfg.dedup_threshold);
        if dropped > 0 {
            debug!(subject = %query.subject, dropped, "near-duplicates removed");
        }

        let scored = self.aggregator.score_batch(items);
        let aggregate = self.aggregator.reduce(&scored, failed);
        let insights = insights::compute(
            aggregate.overall_sentiment,
            &scored,
            aspects,
            self.aggregator.scorer().as_ref(),
            InsightParams {
                neutral_band: self.cfg.neutral_band,
                trend_window: self.cfg.trend_window,
                trend_threshold: self.cfg.trend_threshold,
            },
        );

        let summary = if aggregate.is_degraded() {
            counter!("analyses_degraded_total", "kind" => kind).increment(1);
            warn!(
                subject = %query.subject,
                failed = ?aggregate.failed_sources,
                "analysis degraded"
            );
            None
        } else {
            let texts: Vec<String> = top_by_impact(&scored, self.summary_items)
                .iter()
                .map(|s| s.item.scoring_text().trim().to_string())
                .collect();
            self.summarizer.summarize(&query.text(), &texts).await
        };

        info!(
            kind,
            subject = %query.subject,
            count = aggregate.item_count,
            overall = aggregate.overall_sentiment,
            "analysis done"
        );
        AnalysisReport {
            aggregate,
            insights,
            summary,
        }
    }
}

fn non_blank<'a>(s: &'a str, msg: &'static str) -> Result<&'a str, PipelineError> {
    let t = s.trim();
    if t.is_empty() {
        Err(PipelineError::InvalidInput(msg))
    } else {
        Ok(t)
    }
}
