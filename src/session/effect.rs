//! Effects produced by state transitions

use crate::conversation::Turn;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the completion provider for a reply to `window`
    RequestCompletion { window: Vec<Turn>, epoch: u64 },

    /// Push the new snapshot to connected clients
    NotifyClient,

    /// Tell connected clients a completion failed
    ReportError { message: String },
}
