//! Session runtime executor

use super::{DispatchOutcome, Envelope, SessionUpdate};
use crate::conversation::Turn;
use crate::llm::CompletionClient;
use crate::session::{transition, Effect, Event, SessionSnapshot, SessionState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Runtime for one session, generic over the completion client
pub struct SessionRuntime<C>
where
    C: CompletionClient + 'static,
{
    session_id: String,
    state: SessionState,
    client: Arc<C>,
    event_rx: mpsc::Receiver<Envelope>,
    /// Weak so the loop ends once every handle is dropped
    event_tx: mpsc::WeakSender<Envelope>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<C> SessionRuntime<C>
where
    C: CompletionClient + 'static,
{
    pub fn new(
        session_id: String,
        state: SessionState,
        client: C,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::WeakSender<Envelope>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            session_id,
            state,
            client: Arc::new(client),
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        while let Some(Envelope { event, reply }) = self.event_rx.recv().await {
            let outcome = self.process_event(event);
            if let Some(reply) = reply {
                // The caller may have gone away; the event is applied regardless
                let _ = reply.send(outcome);
            }
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> DispatchOutcome {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(session_id = %self.session_id, reason = %e, "Event rejected");
                return DispatchOutcome {
                    rejected: Some(e),
                    snapshot: self.snapshot(),
                };
            }
        };

        self.state = result.new_state;
        self.snapshot_tx.send_replace(self.snapshot());

        for effect in result.effects {
            self.execute_effect(effect);
        }

        DispatchOutcome {
            rejected: None,
            snapshot: self.snapshot(),
        }
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::RequestCompletion { window, epoch } => self.request_completion(window, epoch),
            Effect::NotifyClient => {
                // No subscribers is fine
                let _ = self
                    .broadcast_tx
                    .send(SessionUpdate::Snapshot(self.snapshot()));
            }
            Effect::ReportError { message } => {
                let _ = self.broadcast_tx.send(SessionUpdate::Error { message });
            }
        }
    }

    /// Spawn the completion request; its outcome comes back as an event
    fn request_completion(&self, window: Vec<Turn>, epoch: u64) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!(session_id = %self.session_id, "Session closing, completion not sent");
            return;
        };
        let client = self.client.clone();
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            tracing::info!(
                session_id = %session_id,
                turns = window.len(),
                "Requesting completion (background)"
            );

            let event = match client.complete(&window).await {
                Ok(text) => Event::ReplyReceived { text, epoch },
                Err(e) => Event::ReplyFailed {
                    message: e.message,
                    epoch,
                },
            };

            if event_tx.send(Envelope { event, reply: None }).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session gone before reply arrived");
            }
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot(&self.session_id)
    }
}
