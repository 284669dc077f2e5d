//! Mock implementations for testing
//!
//! These mocks enable session runtime tests without real network I/O.

use crate::conversation::Turn;
use crate::llm::{CompletionClient, CompletionError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

// ============================================================================
// Mock Completion Client
// ============================================================================

/// Mock completion client that returns queued replies
pub struct MockCompletionClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    /// Record of every window the client was asked to complete
    pub requests: Mutex<Vec<Vec<Turn>>>,
    /// When set, each request waits for one permit before answering
    gate: Option<Arc<Semaphore>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every request until the returned semaphore gets a permit
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let client = Self {
            gate: Some(gate.clone()),
            ..Self::new()
        };
        (client, gate)
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: CompletionError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded request windows
    pub fn recorded_requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(turns.to_vec());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::WINDOW_SIZE;
    use crate::runtime::{SessionHandle, SessionManager, SessionUpdate};
    use crate::session::{Event, SessionSnapshot, Theme, TransitionError};
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn spawn(client: &Arc<MockCompletionClient>) -> SessionHandle {
        SessionHandle::spawn("test-session", client.clone())
    }

    /// Wait for the next snapshot with no request outstanding
    async fn settled(rx: &mut broadcast::Receiver<SessionUpdate>) -> SessionSnapshot {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let SessionUpdate::Snapshot(s) = rx.recv().await.unwrap() {
                    if !s.awaiting_reply {
                        return s;
                    }
                }
            }
        })
        .await
        .expect("session did not settle")
    }

    #[tokio::test]
    async fn test_mock_client_replays_queue() {
        let mock = MockCompletionClient::new();
        mock.queue_reply("Hello");

        assert_eq!(mock.complete(&[Turn::user("hi")]).await.unwrap(), "Hello");
        // Second call should fail (no more replies)
        assert!(mock.complete(&[]).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_hello_round_trip() {
        let client = Arc::new(MockCompletionClient::new());
        client.queue_reply("Hi there");
        let session = spawn(&client);
        let mut rx = session.subscribe();

        let outcome = session.dispatch(Event::submit("Hello")).await.unwrap();
        assert!(outcome.accepted());
        assert!(outcome.snapshot.awaiting_reply);

        let done = settled(&mut rx).await;
        assert_eq!(
            done.turns,
            vec![Turn::user("Hello"), Turn::assistant("Hi there")]
        );
        assert_eq!(client.recorded_requests(), vec![vec![Turn::user("Hello")]]);
        assert_eq!(session.snapshot(), done);
    }

    #[tokio::test]
    async fn test_failure_surfaces_error_and_keeps_history() {
        let client = Arc::new(MockCompletionClient::new());
        client.queue_error(CompletionError::network("Connection failed"));
        let session = spawn(&client);
        let mut rx = session.subscribe();

        session.dispatch(Event::submit("Hello")).await.unwrap();

        let (done, error) = tokio::time::timeout(Duration::from_secs(2), async {
            let mut settled = None;
            let mut error = None;
            while settled.is_none() || error.is_none() {
                match rx.recv().await.unwrap() {
                    SessionUpdate::Snapshot(s) if !s.awaiting_reply => settled = Some(s),
                    SessionUpdate::Snapshot(_) => {}
                    SessionUpdate::Error { message } => error = Some(message),
                }
            }
            (settled.unwrap(), error.unwrap())
        })
        .await
        .unwrap();

        assert_eq!(error, "Connection failed");
        assert!(!done.awaiting_reply);
        assert_eq!(done.turns, vec![Turn::user("Hello")]);
        assert_eq!(done.last_error.as_deref(), Some("Connection failed"));
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_noop() {
        let (client, gate) = MockCompletionClient::gated();
        let client = Arc::new(client);
        client.queue_reply("first reply");
        let session = spawn(&client);
        let mut rx = session.subscribe();

        assert!(session.dispatch(Event::submit("one")).await.unwrap().accepted());
        let second = session.dispatch(Event::submit("two")).await.unwrap();
        assert_eq!(second.rejected, Some(TransitionError::AwaitingReply));
        assert_eq!(second.snapshot.turns, vec![Turn::user("one")]);

        gate.add_permits(1);
        let done = settled(&mut rx).await;
        assert_eq!(
            done.turns,
            vec![Turn::user("one"), Turn::assistant("first reply")]
        );
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_submission_sends_nothing() {
        let client = Arc::new(MockCompletionClient::new());
        let session = spawn(&client);

        let outcome = session.dispatch(Event::submit("   ")).await.unwrap();
        assert_eq!(outcome.rejected, Some(TransitionError::EmptyMessage));
        assert!(outcome.snapshot.turns.is_empty());
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_window_sent_after_ten_turns() {
        let client = Arc::new(MockCompletionClient::new());
        let session = spawn(&client);
        let mut rx = session.subscribe();

        for i in 0..6 {
            client.queue_reply(format!("r{i}"));
            session
                .dispatch(Event::submit(format!("q{i}")))
                .await
                .unwrap();
            settled(&mut rx).await;
        }

        let requests = client.recorded_requests();
        let last = requests.last().unwrap();
        assert_eq!(last.len(), WINDOW_SIZE);
        assert_eq!(last[0], Turn::assistant("r0"));
        assert_eq!(last[9], Turn::user("q5"));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.turns.len(), WINDOW_SIZE);
        assert_eq!(snapshot.turns[0], Turn::user("q1"));
        assert_eq!(snapshot.turns[9], Turn::assistant("r5"));
    }

    #[tokio::test]
    async fn test_clear_during_request_drops_late_reply() {
        let (client, gate) = MockCompletionClient::gated();
        let client = Arc::new(client);
        client.queue_reply("late");
        let session = spawn(&client);
        let mut rx = session.subscribe();

        session
            .dispatch(Event::DraftChanged {
                text: "draft".to_string(),
            })
            .await
            .unwrap();
        session.dispatch(Event::submit("Hello")).await.unwrap();
        let cleared = session.dispatch(Event::Clear).await.unwrap().snapshot;
        assert!(cleared.turns.is_empty());
        assert!(cleared.awaiting_reply);

        gate.add_permits(1);
        let done = settled(&mut rx).await;
        assert!(done.turns.is_empty());
        assert_eq!(done.draft, "");
    }

    #[tokio::test]
    async fn test_theme_change_is_broadcast() {
        let client = Arc::new(MockCompletionClient::new());
        let session = spawn(&client);
        let mut rx = session.subscribe();

        session
            .dispatch(Event::ThemeChanged { theme: Theme::Sunset })
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            SessionUpdate::Snapshot(s) => assert_eq!(s.theme, Theme::Sunset),
            SessionUpdate::Error { message } => panic!("unexpected error: {message}"),
        }
    }

    #[tokio::test]
    async fn test_manager_lifecycle() {
        let client = Arc::new(MockCompletionClient::new());
        let manager = SessionManager::new(client);

        let a = manager.create().await;
        let b = manager.create().await;
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(manager.session_count().await, 2);

        manager
            .dispatch(&a.session_id, Event::ThemeChanged { theme: Theme::Dark })
            .await
            .unwrap();
        assert_eq!(
            manager.snapshot(&a.session_id).await.unwrap().theme,
            Theme::Dark
        );
        assert_eq!(
            manager.snapshot(&b.session_id).await.unwrap().theme,
            Theme::Default
        );

        manager.destroy(&a.session_id).await.unwrap();
        assert!(manager.snapshot(&a.session_id).await.is_err());
        assert!(manager.destroy(&a.session_id).await.is_err());
        assert_eq!(manager.session_count().await, 1);
    }
}
