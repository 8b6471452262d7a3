//! Commentary collaborator.
//!
//! Only the aggregate table ever leaves the process; per-row findings stay local.
//! The HTTP client is blocking (no Tokio runtime required) with a bounded timeout.

use crate::aggregate::AggregateRow;
use crate::config::{Config, SummarizerConfig};
use crate::error::SummarizerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub trait Summarizer: Send + Sync {
    /// Turn an aggregate table into prose
    fn summarize(&self, aggregate: &[AggregateRow]) -> Result<String, SummarizerError>;
}

/// Used when no credential is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSummarizer;

impl Summarizer for NoopSummarizer {
    fn summarize(&self, _aggregate: &[AggregateRow]) -> Result<String, SummarizerError> {
        Err(SummarizerError::Unavailable)
    }
}

/// Pick the HTTP summarizer when a credential exists, otherwise the no-op
pub fn summarizer_from_config(config: &Config) -> Result<Box<dyn Summarizer>, SummarizerError> {
    match &config.summarizer {
        Some(cfg) => Ok(Box::new(HttpSummarizer::new(cfg.clone())?)),
        None => Ok(Box::new(NoopSummarizer)),
    }
}

// ── OpenAI-compatible chat completions ─────────────────────────────

const SYSTEM_PROMPT: &str = "You are an accounting reviewer. Given account classification totals \
from a ledger that has classification inconsistencies, write a short paragraph of commentary on \
what the totals suggest and what a reviewer should check. Do not invent figures.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct HttpSummarizer {
    http: reqwest::blocking::Client,
    config: SummarizerConfig,
}

impl HttpSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self, SummarizerError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("accucheck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizerError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

fn timeout_or(e: reqwest::Error, other: fn(String) -> SummarizerError) -> SummarizerError {
    if e.is_timeout() {
        SummarizerError::Timeout
    } else {
        other(e.to_string())
    }
}

fn render_aggregate(aggregate: &[AggregateRow]) -> String {
    let mut out = String::from("Classification | Total\n");
    for row in aggregate {
        out.push_str(&format!("{} | {:.2}\n", row.classification, row.total));
    }
    out
}

impl Summarizer for HttpSummarizer {
    fn summarize(&self, aggregate: &[AggregateRow]) -> Result<String, SummarizerError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: render_aggregate(aggregate) },
            ],
            temperature: 0.2,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| timeout_or(e, SummarizerError::Network))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(SummarizerError::Http(status.as_u16(), text));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| timeout_or(e, SummarizerError::Parse))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SummarizerError::Parse("response contained no commentary".to_string()))
    }
}
