//! Chat session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `(SessionState, Event) -> (SessionState, Effects)`.

mod effect;
pub mod event;
pub mod state;
mod theme;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{SessionSnapshot, SessionState};
pub use theme::{Theme, ThemeParseError};
pub use transition::{transition, TransitionError};
