//! # Text Scorer
//! Lexicon-based polarity scoring (AFINN-style weights in `-5..=5`).
//!
//! The lexicon is embedded at build time and parsed once. Scoring is pure:
//! identical text always yields the identical value.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Maps free text to a scalar sentiment. Sign is polarity.
pub trait TextScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;

    fn name(&self) -> &'static str {
        "scorer"
    }
}

/// How token weights are reduced into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Plain sum of token weights.
    Sum,
    /// Sum divided by the number of tokens.
    #[default]
    Average,
}

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer {
    mode: ScoreMode,
}

impl LexiconScorer {
    pub fn new(mode: ScoreMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw lexicon sum, token count).
    /// A negator in the previous 1..=3 tokens flips the sign of a word's weight.
    pub fn score_tokens(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl TextScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let (sum, n) = self.score_tokens(text);
        if n == 0 {
            return 0.0;
        }
        match self.mode {
            ScoreMode::Sum => sum as f64,
            ScoreMode::Average => sum as f64 / n as f64,
        }
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lower-cased alphanumeric tokens; inner apostrophes survive so "isn't" stays whole.
pub fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\u{2019}', "'").to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_text_is_neutral() {
        let s = LexiconScorer::default();
        assert_eq!(s.score(""), 0.0);
        assert_eq!(s.score("   \n\t"), 0.0);
        assert_eq!(s.score("!!! ..."), 0.0);
    }

    #[test]
    fn scoring_is_pure() {
        let s = LexiconScorer::new(ScoreMode::Sum);
        let t = "Great app, but terrible support and awful billing";
        assert_eq!(s.score(t), s.score(t));
    }

    #[test]
    fn sum_mode_adds_weights() {
        let s = LexiconScorer::new(ScoreMode::Sum);
        // great(+3) + love(+3)
        assert_eq!(s.score("Great product, love it"), 6.0);
    }

    #[test]
    fn average_mode_divides_by_token_count() {
        let s = LexiconScorer::new(ScoreMode::Average);
        // great(+3) over 2 tokens
        assert!((s.score("great service") - 1.5).abs() < 1e-9);
    }

    #[test]
    fn negation_flips_sign() {
        let s = LexiconScorer::new(ScoreMode::Sum);
        assert!(s.score("good") > 0.0);
        assert!(s.score("not good") < 0.0);
        assert!(s.score("isn't really that good") < 0.0);
        assert!(s.score("it’s not good") < 0.0);
    }

    #[test]
    fn everyday_review_words_carry_weight() {
        assert!(LEXICON.len() >= 1_000, "lexicon has {} entries", LEXICON.len());
        assert!(LEXICON.values().all(|w| (-5..=5).contains(w)));

        let s = LexiconScorer::new(ScoreMode::Sum);
        for w in ["unusable", "glitchy", "unresponsive", "overcharged", "disgusting"] {
            assert!(s.score(w) < 0.0, "{w} should be negative");
        }
        for w in ["seamless", "intuitive", "delightful", "reliable", "grateful"] {
            assert!(s.score(w) > 0.0, "{w} should be positive");
        }
        assert!(s.score("Keeps freezing after the update, totally unusable") < 0.0);
        assert!(s.score("Seamless setup and a helpful, responsive team") > 0.0);
    }

    #[test]
    fn tokenizer_lowercases_and_keeps_inner_apostrophes() {
        let toks: Vec<String> = tokenize("Can't STOP, won't 'stop'").collect();
        assert_eq!(toks, vec!["can't", "stop", "won't", "stop"]);
    }
}
