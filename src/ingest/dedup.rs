// src/ingest/dedup.rs
//! Near-duplicate removal over a fetched batch.
//!
//! Syndicated news and cross-posted threads often show up more than once with
//! minor edits. Two items are duplicates when the normalized Levenshtein
//! similarity of their (lower-cased, whitespace-collapsed) texts reaches the
//! threshold. The first occurrence wins and order is preserved.

use crate::ingest::types::ContentItem;

/// Compared prefix length; keeps the pairwise pass cheap on long bodies.
const COMPARE_CHARS: usize = 300;

fn comparable(item: &ContentItem) -> String {
    let text = item.scoring_text().to_lowercase();
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(COMPARE_CHARS)
        .collect()
}

/// Drop items similar (>= `threshold`) to an earlier kept item.
/// A threshold of 0 or below disables the filter.
/// Returns the kept items and how many were removed.
pub fn dedup_near_duplicates(items: Vec<ContentItem>, threshold: f64) -> (Vec<ContentItem>, usize) {
    if threshold <= 0.0 {
        return (items, 0);
    }

    let mut kept: Vec<ContentItem> = Vec::with_capacity(items.len());
    let mut kept_keys: Vec<String> = Vec::with_capacity(items.len());
    let mut removed = 0usize;

    for item in items {
        let key = comparable(&item);
        let dup = kept_keys
            .iter()
            .any(|k| strsim::normalized_levenshtein(k, &key) >= threshold);
        if dup {
            removed += 1;
            continue;
        }
        kept_keys.push(key);
        kept.push(item);
    }

    (kept, removed)
}
