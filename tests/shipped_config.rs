// tests/shipped_config.rs
//
// The config files committed under config/ must load and agree with the code defaults.

use std::path::Path;

use platform_sentiment::catalog::Catalog;
use platform_sentiment::config::{AppConfig, PipelineConfig};
use platform_sentiment::sentiment::ScoreMode;

#[test]
fn shipped_sentiment_toml_loads() {
    let cfg = AppConfig::load_from(Path::new("config/sentiment.toml")).expect("config loads");
    let d = PipelineConfig::default();

    assert_eq!(cfg.pipeline.top_k, d.top_k);
    assert_eq!(cfg.pipeline.fetch_limit, d.fetch_limit);
    assert_eq!(cfg.pipeline.score_mode, ScoreMode::Average);
    assert_eq!(cfg.pipeline.aspects, d.aspects);
    assert_eq!(cfg.pipeline.location_aspects, d.location_aspects);
    assert!(cfg.sources.newsapi.enabled);
    assert_eq!(cfg.sources.playstore.timeout_secs, 120);
    assert!(!cfg.summary.enabled);
}

#[test]
fn shipped_catalog_is_consistent() {
    let c = Catalog::load_from_file("config/platforms.json").expect("catalog loads");
    assert!(!c.is_empty());

    for s in c.services() {
        assert!(
            !c.platforms_for_service(&s.name).is_empty(),
            "service '{}' has no platforms",
            s.name
        );
    }
    assert_eq!(
        c.find("slack").and_then(|p| p.app_id.as_deref()),
        Some("com.Slack")
    );
}
