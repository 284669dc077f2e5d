//! `OpenRouter` chat-completions client

use super::config::CompletionConfig;
use super::types::{ChatMessage, ChatRequest, ChatResponse, ErrorResponse};
use super::{CompletionClient, CompletionError};
use crate::conversation::Turn;
use async_trait::async_trait;
use reqwest::Client;

/// Client for an `OpenAI`-compatible chat-completions endpoint
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CompletionError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    fn build_request<'a>(&'a self, turns: &'a [Turn]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: turns.iter().map(ChatMessage::from).collect(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let request = self.build_request(turns);
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {e}"))
                } else {
                    CompletionError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(CompletionError::status(
                status.as_u16(),
                format!("HTTP {status}: {message}"),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            CompletionError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(parsed.into_reply())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
