//! # Insights
//! Derived views over a scored batch: a polarity label for the overall
//! sentiment, a rolling-mean trend over fetch order, and aspect-based
//! sentiment (how sentences mentioning e.g. "price" score).

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::{mean, ScoredItem};
use crate::sentiment::TextScorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// `> band` positive, `< -band` negative, otherwise neutral.
pub fn label_for(overall: f64, neutral_band: f64) -> SentimentLabel {
    let band = neutral_band.abs();
    if overall > band {
        SentimentLabel::Positive
    } else if overall < -band {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Upward,
    Downward,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// In [0, 1].
    pub confidence: f64,
}

impl Trend {
    pub fn insufficient() -> Self {
        Self {
            direction: TrendDirection::InsufficientData,
            confidence: 0.0,
        }
    }
}

/// Compare the last two rolling means (window `window`) of `series`.
///
/// Needs at least `window + 1` values. `delta > threshold` is upward,
/// `delta < -threshold` downward. Confidence is `min(|delta| * 10, 1)`.
pub fn trend(series: &[f64], window: usize, threshold: f64) -> Trend {
    if window == 0 || series.len() < window + 1 {
        return Trend::insufficient();
    }
    let n = series.len();
    let last = mean(series[n - window..].iter().copied());
    let prev = mean(series[n - window - 1..n - 1].iter().copied());
    let delta = last - prev;

    let direction = if delta > threshold {
        TrendDirection::Upward
    } else if delta < -threshold {
        TrendDirection::Downward
    } else {
        TrendDirection::Stable
    };
    Trend {
        direction,
        confidence: (delta.abs() * 10.0).min(1.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectScore {
    pub avg_score: f64,
    /// Number of sentences that mentioned the aspect.
    pub count: usize,
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    static RE_SPLIT: OnceCell<Regex> = OnceCell::new();
    let re = RE_SPLIT.get_or_init(|| Regex::new(r"[.!?\n]+").expect("sentence split regex"));
    re.split(text).map(str::trim).filter(|s| !s.is_empty())
}

/// Per aspect: mean over items of the mean score of that item's sentences
/// mentioning the aspect. Unmentioned aspects report `0 / 0`.
pub fn aspect_sentiment(
    batch: &[ScoredItem],
    aspects: &[String],
    scorer: &dyn TextScorer,
) -> BTreeMap<String, AspectScore> {
    let mut out = BTreeMap::new();

    for aspect in aspects {
        let needle = aspect.replace('_', " ").to_lowercase();
        if needle.trim().is_empty() {
            continue;
        }

        let mut per_item: Vec<f64> = Vec::new();
        let mut count = 0usize;
        for s in batch {
            let text = s.item.scoring_text();
            let hits: Vec<f64> = sentences(&text)
                .filter(|sent| sent.to_lowercase().contains(&needle))
                .map(|sent| scorer.score(sent))
                .collect();
            if hits.is_empty() {
                continue;
            }
            count += hits.len();
            per_item.push(mean(hits.into_iter()));
        }

        out.insert(
            aspect.clone(),
            AspectScore {
                avg_score: mean(per_item.into_iter()),
                count,
            },
        );
    }
    out
}

/// Label, trend and aspects for one scored batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub label: SentimentLabel,
    pub trend: Trend,
    pub aspects: BTreeMap<String, AspectScore>,
}

#[derive(Debug, Clone, Copy)]
pub struct InsightParams {
    pub neutral_band: f64,
    pub trend_window: usize,
    pub trend_threshold: f64,
}

pub fn compute(
    overall: f64,
    batch: &[ScoredItem],
    aspects: &[String],
    scorer: &dyn TextScorer,
    params: InsightParams,
) -> Insights {
    let series: Vec<f64> = batch.iter().map(|s| s.sentiment).collect();
    Insights {
        label: label_for(overall, params.neutral_band),
        trend: trend(&series, params.trend_window, params.trend_threshold),
        aspects: aspect_sentiment(batch, aspects, scorer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{ContentItem, SourceKind};
    use crate::sentiment::{LexiconScorer, ScoreMode};

    #[test]
    fn labels_respect_neutral_band() {
        assert_eq!(label_for(0.3, 0.05), SentimentLabel::Positive);
        assert_eq!(label_for(-0.3, 0.05), SentimentLabel::Negative);
        assert_eq!(label_for(0.05, 0.05), SentimentLabel::Neutral);
        assert_eq!(label_for(0.0, 0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn short_series_is_insufficient() {
        let t = trend(&[1.0, 2.0, 3.0], 7, 0.05);
        assert_eq!(t.direction, TrendDirection::InsufficientData);
        assert_eq!(t.confidence, 0.0);
    }

    #[test]
    fn rising_tail_is_upward() {
        // window 3: prev = mean(0,0,0) = 0, last = mean(0,0,3) = 1
        let t = trend(&[0.0, 0.0, 0.0, 3.0], 3, 0.05);
        assert_eq!(t.direction, TrendDirection::Upward);
        assert_eq!(t.confidence, 1.0);
    }

    #[test]
    fn flat_series_is_stable_and_falling_is_downward() {
        let flat = trend(&[1.0; 10], 7, 0.05);
        assert_eq!(flat.direction, TrendDirection::Stable);
        let t = trend(&[0.3, 0.0, 0.0], 2, 0.05);
        // prev = mean(0.3, 0) = 0.15, last = 0 → delta -0.15
        assert_eq!(t.direction, TrendDirection::Downward);
        assert!((t.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn aspects_average_mentioning_sentences() {
        let scorer = LexiconScorer::new(ScoreMode::Sum);
        let batch = vec![
            ScoredItem {
                item: ContentItem::new(SourceKind::Review, "t", "")
                    .with_description("The price is great. Support is slow."),
                sentiment: 0.0,
            },
            ScoredItem {
                item: ContentItem::new(SourceKind::Review, "t", "Awful price hike"),
                sentiment: 0.0,
            },
        ];
        let aspects = vec!["price".to_string(), "local_response".to_string()];
        let out = aspect_sentiment(&batch, &aspects, &scorer);

        let price = out["price"];
        assert_eq!(price.count, 2);
        // item1: "The price is great" = +3; item2: "Awful price hike" = -3
        assert!((price.avg_score - 0.0).abs() < 1e-9);

        let local = out["local_response"];
        assert_eq!(local.count, 0);
        assert_eq!(local.avg_score, 0.0);
    }
}
