//! Optional external text-generation summarizer.
//!
//! The summarizer is an injected capability: callers hold a `Summarizer`
//! and never branch on credential presence themselves. When no API key is
//! configured the disabled implementation is injected and the external path
//! is never attempted. Every failure mode (network, HTTP status, payload
//! shape) is a soft miss that returns `None` so the deterministic summary
//! takes over.

use std::{env, time::Duration};

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const MODEL_ENV: &str = "OPENAI_MODEL";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f64 = 0.2;

const SYSTEM_PROMPT: &str =
    "You are a concise assistant that summarizes real-estate aggregated statistics into 2-3 sentences.";

pub trait Summarizer {
    /// Best-effort summary for `prompt`; `None` means unavailable.
    fn summarize(&self, prompt: &str) -> Option<String>;
}

/// Injected when no credential is configured.
pub struct NoSummarizer;

impl Summarizer for NoSummarizer {
    fn summarize(&self, _prompt: &str) -> Option<String> {
        None
    }
}

pub struct OpenAiSummarizer {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    /// Builds a summarizer from `OPENAI_API_KEY`/`OPENAI_MODEL`, or `None`
    /// when the key is absent or the HTTP client cannot be constructed.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())?;
        let model = env::var(MODEL_ENV)
            .ok()
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| warn!("Failed to build HTTP client for summarizer: {err}"))
            .ok()?;
        Some(OpenAiSummarizer {
            client,
            api_key,
            model,
        })
    }

    fn request(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting external summary ({} chars of prompt, model {})",
            prompt.len(),
            self.model
        );
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });
        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("Sending completion request")?
            .error_for_status()
            .context("Completion request rejected")?;
        let completion: Completion = response.json().context("Decoding completion response")?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Completion response contained no choices"))?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Completion response was empty"));
        }
        Ok(trimmed.to_string())
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, prompt: &str) -> Option<String> {
        match self.request(prompt) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("External summary failed, falling back to template: {err:#}");
                None
            }
        }
    }
}

/// The summarizer to inject for this process: the external client when a
/// credential is configured, the disabled one otherwise.
pub fn summarizer_from_env() -> Box<dyn Summarizer> {
    match OpenAiSummarizer::from_env() {
        Some(summarizer) => Box::new(summarizer),
        None => {
            debug!("{API_KEY_ENV} not set; external summaries disabled");
            Box::new(NoSummarizer)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}
