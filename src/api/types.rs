//! API request and response types

use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Request to replace the draft text
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

/// Request to submit a message; without `text` the current draft is sent
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Request to switch theme
#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// Response for submit
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub snapshot: SessionSnapshot,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for theme list
#[derive(Debug, Serialize)]
pub struct ThemesResponse {
    pub themes: Vec<&'static str>,
    pub default: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
