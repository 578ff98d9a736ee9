//! Translation service - Chinese to natural English via a chat-completion endpoint
//!
//! One prompt, one primary attempt, at most one fallback attempt.

use crate::config::CompletionConfig;
use crate::services::prompt::build_prompt;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Translation service that talks to the configured completion endpoint
#[derive(Clone)]
pub struct TranslatorService {
    config: CompletionConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

impl TranslatorService {
    /// Create a new translator service
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Translate Chinese `text` into an ordered list of English candidates.
    ///
    /// Fails only when both the primary and the fallback attempt come back empty.
    pub async fn translate(&self, text: &str, context: Option<&str>) -> Result<Vec<String>> {
        if !looks_like_chinese(text) {
            debug!("Input does not look like Chinese, translating anyway: {}", truncate_str(text, 50));
        }

        let prompt = build_prompt(text, context);

        let primary = self.attempt(&prompt, &self.config.model, "primary").await;
        if !primary.is_empty() {
            return Ok(primary);
        }

        let fallback_model = self
            .config
            .fallback_model
            .as_deref()
            .unwrap_or(&self.config.model);
        info!("Primary translation empty, trying fallback with {}", fallback_model);

        let fallback = self.attempt(&prompt, fallback_model, "fallback").await;
        if !fallback.is_empty() {
            return Ok(fallback);
        }

        error!("Translation failed after fallback ({} chars of input)", text.chars().count());
        anyhow::bail!("No translation candidates returned")
    }

    /// One completion call; errors are logged and count as no output
    async fn attempt(&self, prompt: &str, model: &str, label: &str) -> Vec<String> {
        match self.complete(prompt, model).await {
            Ok(content) => {
                let candidates = parse_candidates(&content);
                debug!("{} attempt returned {} candidates", label, candidates.len());
                candidates
            }
            Err(e) => {
                warn!("Error in {} translation: {:#}", label, e);
                Vec::new()
            }
        }
    }

    /// Send `prompt` to the completion endpoint and return the raw reply text
    pub async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let request = CompletionRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Requesting completion from {} with {}", self.config.endpoint, model);

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion request failed: {} - {}", status, body);
        }

        let result: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .context("Completion response has no choices")
    }
}

/// Split raw model output into trimmed, non-empty lines in their original order
pub fn parse_candidates(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Whether whatlang thinks `text` is Mandarin. Undetectable input counts as Chinese.
fn looks_like_chinese(text: &str) -> bool {
    match whatlang::detect(text) {
        Some(info) => info.lang() == whatlang::Lang::Cmn || !info.is_reliable(),
        None => true,
    }
}

/// Truncate a string for logging
fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
