// tests/aggregate_settle_all.rs
//
// Aggregator behaviour across several fetchers: failures, timeouts and
// panics are contained, the batch keeps fetcher order, and top items are ranked by
// absolute sentiment with stable ties.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use platform_sentiment::aggregate::{top_by_impact, Aggregator, ScoredItem, EMPTY_BATCH_ERROR};
use platform_sentiment::ingest::types::{
    ContentItem, FetchError, SearchQuery, SourceFetcher, SourceKind,
};
use platform_sentiment::sentiment::{LexiconScorer, ScoreMode, TextScorer};

struct Items {
    name: &'static str,
    titles: Vec<&'static str>,
}

#[async_trait]
impl SourceFetcher for Items {
    async fn fetch(&self, _q: &SearchQuery, _limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self
            .titles
            .iter()
            .map(|t| ContentItem::new(SourceKind::News, self.name, *t))
            .collect())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

struct Failing;

#[async_trait]
impl SourceFetcher for Failing {
    async fn fetch(&self, _q: &SearchQuery, _limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        Err(FetchError::Status {
            provider: "failing",
            status: 503,
        })
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Sleeps far past its own timeout.
struct Slow;

#[async_trait]
impl SourceFetcher for Slow {
    async fn fetch(&self, _q: &SearchQuery, _limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![ContentItem::new(SourceKind::News, "slow", "never seen")])
    }
    fn name(&self) -> &'static str {
        "slow"
    }
    fn timeout(&self) -> Duration {
        Duration::from_millis(50)
    }
}

/// Panics mid-fetch.
struct Exploding;

#[async_trait]
impl SourceFetcher for Exploding {
    async fn fetch(&self, _q: &SearchQuery, _limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        panic!("provider bug");
    }
    fn name(&self) -> &'static str {
        "exploding"
    }
}

/// Ignores the requested limit.
struct Flood;

#[async_trait]
impl SourceFetcher for Flood {
    async fn fetch(&self, _q: &SearchQuery, _limit: usize) -> Result<Vec<ContentItem>, FetchError> {
        Ok((0..250)
            .map(|i| ContentItem::new(SourceKind::Social, "flood", format!("post {i}")))
            .collect())
    }
    fn name(&self) -> &'static str {
        "flood"
    }
}

fn aggregator() -> Aggregator {
    Aggregator::new(Arc::new(LexiconScorer::new(ScoreMode::Sum)))
}

fn q() -> SearchQuery {
    SearchQuery::subject("Slack")
}

#[tokio::test]
async fn timeout_and_failure_do_not_block_successful_fetcher() {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(Slow),
        Arc::new(Items {
            name: "ok",
            titles: vec!["great update", "bad outage", "meh"],
        }),
        Arc::new(Failing),
    ];

    let started = std::time::Instant::now();
    let out = aggregator().aggregate(&q(), &fetchers).await;

    assert!(started.elapsed() < Duration::from_secs(5), "slow fetcher must be cut off");
    assert_eq!(out.item_count, 3);
    assert!(out.error.is_none());
    assert_eq!(out.failed_sources, vec!["slow".to_string(), "failing".to_string()]);
}

#[tokio::test]
async fn panicking_fetcher_keeps_sibling_items() {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(Items {
            name: "ok",
            titles: vec!["great update", "bad outage", "meh"],
        }),
        Arc::new(Exploding),
        Arc::new(Items {
            name: "late",
            titles: vec!["love it"],
        }),
    ];

    // Spawned so an escaping panic would surface as a JoinError.
    let out = tokio::spawn(async move { aggregator().aggregate(&q(), &fetchers).await })
        .await
        .expect("panic contained inside the fan-out");

    assert_eq!(out.item_count, 4);
    assert!(out.error.is_none());
    assert_eq!(out.failed_sources, vec!["exploding".to_string()]);
    assert_eq!(out.source_counts.get("ok"), Some(&3));
    assert_eq!(out.source_counts.get("late"), Some(&1));
    assert!(!out.source_counts.contains_key("exploding"));
}

#[tokio::test]
async fn all_fetchers_failing_yields_degraded_result() {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(Failing), Arc::new(Slow)];
    let out = aggregator().aggregate(&q(), &fetchers).await;

    assert_eq!(out.overall_sentiment, 0.0);
    assert!(out.top_items.is_empty());
    assert_eq!(out.error.as_deref(), Some(EMPTY_BATCH_ERROR));
    assert_eq!(out.failed_sources.len(), 2);
}

#[tokio::test]
async fn no_fetchers_is_an_empty_batch() {
    let out = aggregator().aggregate(&q(), &[]).await;
    assert_eq!(out.error.as_deref(), Some(EMPTY_BATCH_ERROR));
    assert!(out.failed_sources.is_empty());
}

#[tokio::test]
async fn batch_concatenates_in_fetcher_order() {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(Items {
            name: "first",
            titles: vec!["a1", "a2"],
        }),
        Arc::new(Items {
            name: "second",
            titles: vec!["b1"],
        }),
    ];
    let outcome = aggregator().collect(&q(), &fetchers).await;
    let titles: Vec<&str> = outcome.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["a1", "a2", "b1"]);
}

#[tokio::test]
async fn oversized_provider_answer_is_capped() {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(Flood)];
    let out = aggregator()
        .with_fetch_limit(40)
        .aggregate(&q(), &fetchers)
        .await;
    assert_eq!(out.item_count, 40);
}

#[tokio::test]
async fn overall_is_mean_of_item_scores() {
    let scorer = LexiconScorer::new(ScoreMode::Sum);
    let titles = vec!["great great", "terrible", "love it", "nothing here"];
    let expected =
        titles.iter().map(|t| scorer.score(t)).sum::<f64>() / titles.len() as f64;

    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(Items {
        name: "ok",
        titles,
    })];
    let out = aggregator().aggregate(&q(), &fetchers).await;
    assert!((out.overall_sentiment - expected).abs() < 1e-9);
}

#[test]
fn top_items_are_ranked_and_stable_for_random_batches() {
    let mut rng = rand::rng();
    let mut values: Vec<f64> = vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 2.0, -2.0, 1.5];

    for _ in 0..50 {
        values.shuffle(&mut rng);
        let k = rng.random_range(0..=values.len() + 2);
        let batch: Vec<ScoredItem> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ScoredItem {
                item: ContentItem::new(SourceKind::News, "rand", format!("{i}")),
                sentiment: *v,
            })
            .collect();

        let top = top_by_impact(&batch, k);
        assert_eq!(top.len(), k.min(batch.len()));

        for w in top.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            assert!(a.sentiment.abs() >= b.sentiment.abs(), "non-increasing |sentiment|");
            if a.sentiment.abs() == b.sentiment.abs() {
                let ia: usize = a.item.title.parse().unwrap();
                let ib: usize = b.item.title.parse().unwrap();
                assert!(ia < ib, "ties keep batch order");
            }
        }
    }
}
