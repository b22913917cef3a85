// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::env;

fn default_provider() -> String {
    "openai".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_items() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    15
}

/// `[summary]` section: optional LLM summary of the highlighted items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// How many top items feed the prompt.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            api_key: default_api_key(),
            model: default_model(),
            max_items: default_max_items(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SummaryConfig {
    /// Lower-case provider, resolve the key, and fail if an enabled OpenAI
    /// summary has no key.
    pub fn normalized(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        }

        if self.enabled {
            match self.provider.as_str() {
                "openai" if self.api_key.trim().is_empty() => {
                    anyhow::bail!("summary enabled but OPENAI_API_KEY is not set")
                }
                "openai" | "mock" => {}
                other => anyhow::bail!("Unsupported summary provider in config: {other}"),
            }
        }

        if self.max_items == 0 {
            self.max_items = default_max_items();
        }
        Ok(self)
    }
}
