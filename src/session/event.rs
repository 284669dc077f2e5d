//! Events that can occur in a session

use super::Theme;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    DraftChanged {
        text: String,
    },
    /// Submit `text`, or the current draft when `None`
    Submit {
        text: Option<String>,
    },
    Clear,
    ThemeChanged {
        theme: Theme,
    },

    // Completion events
    ReplyReceived {
        text: String,
        epoch: u64,
    },
    ReplyFailed {
        message: String,
        epoch: u64,
    },
}

#[cfg(test)]
impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit {
            text: Some(text.into()),
        }
    }
}
