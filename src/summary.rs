//! Summarizer: optional short LLM summary of the highlighted items.
//! Failures never surface as errors; the response just carries no summary.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ai::SummaryConfig;

const MAX_SUMMARY_CHARS: usize = 320;
/// Prompt input cap (chars).
const MAX_PROMPT_CHARS: usize = 3000;

pub trait Summarizer: Send + Sync {
    /// Summarize `texts` for `subject`; `None` when unavailable.
    fn summarize<'a>(
        &'a self,
        subject: &'a str,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    fn provider_name(&self) -> &'static str;
}

pub type DynSummarizer = Arc<dyn Summarizer>;

/// Factory.
///
/// * `AI_TEST_MODE=mock` returns the mock summarizer.
/// * `enabled == false` returns the disabled summarizer.
/// * Otherwise builds the configured provider.
pub fn build_summarizer(cfg: &SummaryConfig) -> DynSummarizer {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockSummarizer::default());
    }
    if !cfg.enabled {
        return Arc::new(DisabledSummarizer);
    }
    match cfg.provider.as_str() {
        "openai" => match OpenAiSummarizer::new(cfg) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::warn!(error = %e, "openai summarizer unavailable");
                Arc::new(DisabledSummarizer)
            }
        },
        "mock" => Arc::new(MockSummarizer::default()),
        _ => Arc::new(DisabledSummarizer),
    }
}

pub struct DisabledSummarizer;

impl Summarizer for DisabledSummarizer {
    fn summarize<'a>(
        &'a self,
        _subject: &'a str,
        _texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Clone)]
pub struct MockSummarizer {
    pub fixed: String,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self {
            fixed: "Mixed coverage (mock)".to_string(),
        }
    }
}

impl Summarizer for MockSummarizer {
    fn summarize<'a>(
        &'a self,
        _subject: &'a str,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = (!texts.is_empty()).then(|| self.fixed.clone());
        Box::pin(async move { out })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Chat Completions backed summarizer.
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(cfg: &SummaryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("platform-sentiment/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize<'a>(
        &'a self,
        subject: &'a str,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() || texts.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let sys = "Summarize what people say about the subject in 2-3 short sentences, neutral tone, no emojis. Use only the given content.";
            let user = build_prompt(subject, texts);
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: sys,
                    },
                    Msg {
                        role: "user",
                        content: &user,
                    },
                ],
                temperature: 0.2,
                max_tokens: 160,
            };

            let resp = match self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "summary request failed");
                    return None;
                }
            };
            if !resp.status().is_success() {
                tracing::warn!(status = resp.status().as_u16(), "summary request rejected");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .unwrap_or("");
            let cleaned = sanitize_summary(content);
            (!cleaned.is_empty()).then_some(cleaned)
        })
    }
    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn build_prompt(subject: &str, texts: &[String]) -> String {
    let mut out = format!("Subject: {subject}\n\n");
    for t in texts {
        if out.len() + t.len() + 3 > MAX_PROMPT_CHARS {
            break;
        }
        out.push_str("- ");
        out.push_str(t.trim());
        out.push('\n');
    }
    out
}

/// ASCII only, single line, at most `MAX_SUMMARY_CHARS`. Collapses whitespace.
pub fn sanitize_summary(input: &str) -> String {
    let mut out = String::with_capacity(MAX_SUMMARY_CHARS);
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\r' | '\n' | '\t' => ' ',
            c if c.is_ascii() => c,
            _ => ' ',
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.len() >= MAX_SUMMARY_CHARS {
            break;
        }
    }
    out.trim().to_string()
}
