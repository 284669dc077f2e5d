//! Completion error types

use thiserror::Error;

/// A completion request failed.
///
/// There is one failure class; the kind only says where it happened.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Network, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Status(status), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::MalformedResponse, message)
    }
}

/// Where a completion request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// Connection, timeout, or body read failure
    Network,
    /// Provider answered with a non-success HTTP status
    Status(u16),
    /// Response body was not the expected JSON
    MalformedResponse,
}
