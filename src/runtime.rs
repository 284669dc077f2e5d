//! Runtime for executing chat sessions
//!
//! Each session runs as its own task; the manager routes events to it
//! and hands out snapshots and update subscriptions.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::llm::CompletionClient;
use crate::session::{Event, SessionSnapshot, SessionState, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};

/// Updates sent to subscribed clients
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Snapshot(SessionSnapshot),
    Error { message: String },
}

/// Result of handing one event to a session
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Set when the session refused the event; the state did not change
    pub rejected: Option<TransitionError>,
    pub snapshot: SessionSnapshot,
}

impl DispatchOutcome {
    pub fn accepted(&self) -> bool {
        self.rejected.is_none()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session runtime stopped")]
    Closed,
}

/// Event plus an optional reply channel
pub struct Envelope {
    pub event: Event,
    pub reply: Option<oneshot::Sender<DispatchOutcome>>,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Start a runtime for a fresh session
    pub fn spawn<C>(session_id: &str, client: C) -> Self
    where
        C: CompletionClient + 'static,
    {
        let state = SessionState::new();
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot(session_id));

        let runtime = SessionRuntime::new(
            session_id.to_string(),
            state,
            client,
            event_rx,
            event_tx.downgrade(),
            broadcast_tx.clone(),
            snapshot_tx,
        );

        let id = session_id.to_string();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session_id = %id, "Session runtime finished");
        });

        Self {
            event_tx,
            broadcast_tx,
            snapshot_rx,
        }
    }

    /// Send an event and wait for the session to apply it
    pub async fn dispatch(&self, event: Event) -> Result<DispatchOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.broadcast_tx.subscribe()
    }
}

/// Manager for all live sessions
pub struct SessionManager {
    client: Arc<dyn CompletionClient>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session and start its runtime
    pub async fn create(&self) -> SessionSnapshot {
        let session_id = uuid::Uuid::new_v4().to_string();
        let handle = SessionHandle::spawn(&session_id, self.client.clone());
        let snapshot = handle.snapshot();

        self.sessions.write().await.insert(session_id.clone(), handle);
        tracing::info!(session_id = %session_id, "Session created");
        snapshot
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub async fn dispatch(
        &self,
        session_id: &str,
        event: Event,
    ) -> Result<DispatchOutcome, SessionError> {
        self.get(session_id).await?.dispatch(event).await
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        Ok(self.get(session_id).await?.snapshot())
    }

    /// Current snapshot plus a receiver for later updates
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SessionUpdate>), SessionError> {
        let handle = self.get(session_id).await?;
        let rx = handle.subscribe();
        Ok((handle.snapshot(), rx))
    }

    /// Discard a session. Its runtime stops once any in-flight request settles.
    pub async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        tracing::info!(session_id = %session_id, "Session destroyed");
        Ok(())
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
