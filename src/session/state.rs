//! Session state types

use super::Theme;
use crate::conversation::{Conversation, Turn, WINDOW_SIZE};
use serde::Serialize;

/// State owned by one chat session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub conversation: Conversation,
    /// Current input text
    pub draft: String,
    /// Set while a completion request is outstanding
    pub awaiting_reply: bool,
    /// Bumped on every clear; replies carry the epoch they were requested under
    pub epoch: u64,
    pub theme: Theme,
    /// Most recent completion failure, cleared on the next submission
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns visible to the presentation layer
    pub fn visible_turns(&self) -> &[Turn] {
        self.conversation.window(WINDOW_SIZE)
    }

    pub fn snapshot(&self, session_id: &str) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session_id.to_string(),
            turns: self.visible_turns().to_vec(),
            draft: self.draft.clone(),
            awaiting_reply: self.awaiting_reply,
            theme: self.theme,
            dark: self.theme.is_dark(),
            last_error: self.last_error.clone(),
        }
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub turns: Vec<Turn>,
    pub draft: String,
    pub awaiting_reply: bool,
    pub theme: Theme,
    /// Render light text on a dark background
    pub dark: bool,
    pub last_error: Option<String>,
}
