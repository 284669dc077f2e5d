//! Completion provider client
//!
//! Sends a window of the conversation to a hosted chat-completions
//! endpoint and returns the assistant's reply text.

mod config;
mod error;
mod openrouter;
mod types;

pub use config::CompletionConfig;
pub use error::CompletionError;
pub use openrouter::OpenRouterClient;

use crate::conversation::Turn;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for completion providers
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request one assistant reply for the given turns.
    ///
    /// `turns` is expected to be windowed already. A provider response
    /// without reply content yields `Ok(String::new())`.
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        (**self).complete(turns).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for completion clients
pub struct LoggingClient {
    inner: Arc<dyn CompletionClient>,
    model_id: String,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn CompletionClient>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl CompletionClient for LoggingClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(turns).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    turns = turns.len(),
                    reply_len = reply.len(),
                    "Completion request finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    turns = turns.len(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Completion request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
