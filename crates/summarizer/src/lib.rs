use crate::error::SummarizerError;
use crate::prompt::{digest_prompt, empty_digest};
use async_trait::async_trait;
use configuration::SummarizerConfig;
use news::Article;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub mod prompt;

/// Turns a list of articles into a short human-readable digest.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize(&self, articles: &[Article]) -> Result<String, SummarizerError>;
}

/// The JSON payload for the `chat/completions` endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// A client for an OpenAI-compatible chat completions API.
pub struct ChatSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatSummarizer {
    /// Creates a new `ChatSummarizer`.
    ///
    /// Returns `Ok(None)` if no API key is configured, allowing the system to gracefully
    /// disable news digests.
    pub fn new(config: &SummarizerConfig) -> Result<Option<Self>, SummarizerError> {
        if config.api_key.trim().is_empty() {
            tracing::warn!("Summarizer is not configured (missing API key).");
            return Ok(None);
        }
        Ok(Some(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        }))
    }
}

#[async_trait]
impl Summarize for ChatSummarizer {
    async fn summarize(&self, articles: &[Article]) -> Result<String, SummarizerError> {
        let today = chrono::Local::now().date_naive();
        if articles.is_empty() {
            return Ok(empty_digest(today));
        }

        let prompt = digest_prompt(articles, today);
        let payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        tracing::debug!(articles = articles.len(), model = %self.model, "Requesting news digest.");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummarizerError::EmptyResponse)
    }
}
