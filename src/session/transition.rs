//! Pure state transition function

use super::{Effect, Event, SessionState};
use crate::conversation::{Turn, WINDOW_SIZE};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the session refuses. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting for the previous reply")]
    AwaitingReply,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs, it always produces the same outputs, with no I/O
/// side effects.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::DraftChanged { text } => {
            let mut next = state.clone();
            next.draft = text;
            Ok(TransitionResult::new(next))
        }

        Event::Submit { text } => {
            let raw = text.as_deref().unwrap_or(state.draft.as_str());
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            if state.awaiting_reply {
                return Err(TransitionError::AwaitingReply);
            }

            let mut next = state.clone();
            next.conversation.append(Turn::user(trimmed));
            next.draft.clear();
            next.awaiting_reply = true;
            next.last_error = None;

            let window = next.conversation.window(WINDOW_SIZE).to_vec();
            // Keep the stored history bounded even when no reply ever lands
            next.conversation.truncate_to_window(WINDOW_SIZE);
            let epoch = next.epoch;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::RequestCompletion { window, epoch })
                .with_effect(Effect::NotifyClient))
        }

        Event::ReplyReceived { text, epoch } => {
            if !state.awaiting_reply {
                return Err(TransitionError::InvalidTransition(
                    "reply received with no request outstanding".to_string(),
                ));
            }
            let mut next = state.clone();
            next.awaiting_reply = false;
            // A clear happened while the request was in flight
            if epoch == state.epoch {
                next.conversation.append(Turn::assistant(text));
                next.conversation.truncate_to_window(WINDOW_SIZE);
            }
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyClient))
        }

        Event::ReplyFailed { message, epoch } => {
            if !state.awaiting_reply {
                return Err(TransitionError::InvalidTransition(
                    "failure received with no request outstanding".to_string(),
                ));
            }
            let mut next = state.clone();
            next.awaiting_reply = false;
            if epoch != state.epoch {
                return Ok(TransitionResult::new(next).with_effect(Effect::NotifyClient));
            }
            next.last_error = Some(message.clone());
            Ok(TransitionResult::new(next)
                .with_effect(Effect::NotifyClient)
                .with_effect(Effect::ReportError { message }))
        }

        Event::Clear => {
            let mut next = state.clone();
            next.conversation.clear();
            next.draft.clear();
            next.last_error = None;
            next.epoch = state.epoch.wrapping_add(1);
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyClient))
        }

        Event::ThemeChanged { theme } => {
            let mut next = state.clone();
            next.theme = theme;
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyClient))
        }
    }
}
