//! Single-flight chat session state machine.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{
    AppMode, ChatMessage, RecentSearches, Sender, SessionEvent, SessionState, Transcript,
};
use crate::completion::CompletionClient;
use crate::error::CompletionError;

/// Bot reply appended when a completion call fails for any reason.
pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an error. Please try again.";

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Tunables for a [`SessionController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upper bound for a single completion call. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Buffer size of the event channel; slow subscribers lag past this.
    pub event_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Consistent copy of everything a host shell draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub transcript: Transcript,
    pub recent_searches: RecentSearches,
    pub state: SessionState,
}

struct InFlight {
    request_id: u64,
    token: CancellationToken,
}

struct SessionData {
    transcript: Transcript,
    recent_searches: RecentSearches,
    state: SessionState,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

/// Owns the transcript, the recent searches and the Idle/AwaitingCompletion
/// state machine, and sequences each submission through a
/// [`CompletionClient`].
///
/// At most one completion call is outstanding. `submit` while one is in
/// flight is dropped, not queued. Completion failures never escape: they are
/// logged and turned into [`APOLOGY_MESSAGE`].
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct SessionController {
    data: Arc<RwLock<SessionData>>,
    client: Arc<dyn CompletionClient>,
    events: broadcast::Sender<SessionEvent>,
    request_timeout: Option<Duration>,
}

impl SessionController {
    /// Starts a session seeded with the greeting, with default options.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_options(client, ControllerOptions::default())
    }

    pub fn with_options(client: Arc<dyn CompletionClient>, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        let data = SessionData {
            transcript: Transcript::seeded(),
            recent_searches: RecentSearches::new(),
            state: SessionState::default(),
            in_flight: None,
            next_request_id: 0,
        };

        Self {
            data: Arc::new(RwLock::new(data)),
            client,
            events,
            request_timeout: options.request_timeout,
        }
    }

    /// Subscribes to change notifications.
    ///
    /// Only events published after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let data = self.data.read().await;
        SessionSnapshot {
            transcript: data.transcript.clone(),
            recent_searches: data.recent_searches.clone(),
            state: data.state.clone(),
        }
    }

    pub async fn transcript(&self) -> Transcript {
        self.data.read().await.transcript.clone()
    }

    pub async fn recent_searches(&self) -> RecentSearches {
        self.data.read().await.recent_searches.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.data.read().await.state.clone()
    }

    /// Replaces the text in the input box.
    pub async fn set_pending_input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut data = self.data.write().await;
        if data.state.pending_input == text {
            return;
        }
        data.state.pending_input = text;
        self.publish(SessionEvent::StateChanged(data.state.clone()));
    }

    /// Submits the current pending input.
    pub async fn submit_pending(&self) -> Option<CompletionHandle> {
        let input = self.data.read().await.state.pending_input.clone();
        self.submit(&input).await
    }

    /// Sends `input` to the completion client.
    ///
    /// Returns `None` without touching any state when `input` is blank or a
    /// request is already in flight. Otherwise the trimmed input is appended
    /// as a user message and recorded in the recent searches, the pending
    /// input is cleared, and the call is started in a background task whose
    /// handle is returned.
    pub async fn submit(&self, input: &str) -> Option<CompletionHandle> {
        let question = input.trim();
        if question.is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }

        let mut data = self.data.write().await;
        if data.state.is_request_in_flight() {
            debug!("Dropping submission while a completion is outstanding");
            return None;
        }

        let message = ChatMessage::new(Sender::User, question);
        data.transcript.push(message.clone());
        data.recent_searches.push(question);
        data.state.pending_input.clear();
        data.state.mode = AppMode::AwaitingCompletion;

        let request_id = data.next_request_id;
        data.next_request_id += 1;
        let token = CancellationToken::new();
        data.in_flight = Some(InFlight {
            request_id,
            token: token.clone(),
        });

        self.publish(SessionEvent::MessageAppended(message));
        self.publish(SessionEvent::RecentSearchesChanged(
            data.recent_searches.to_vec(),
        ));
        self.publish(SessionEvent::StateChanged(data.state.clone()));
        info!(
            request_id,
            transcript_len = data.transcript.len(),
            "Submitted question, awaiting completion"
        );
        drop(data);

        Some(self.spawn_completion(request_id, question.to_string(), token))
    }

    /// Applies the outcome of the outstanding request.
    ///
    /// Returns `false` and changes nothing when no request is in flight. Any
    /// background call still running for the request is cancelled and its
    /// own outcome discarded.
    pub async fn resolve(&self, outcome: Result<String, CompletionError>) -> bool {
        let mut data = self.data.write().await;
        let Some(in_flight) = data.in_flight.take() else {
            debug!("Ignoring resolve while idle");
            return false;
        };
        in_flight.token.cancel();
        self.apply_outcome(&mut data, in_flight.request_id, outcome);
        true
    }

    /// Copies `entry` into the input box and closes the panel. Does not
    /// submit.
    pub async fn select_recent_search(&self, entry: &str) {
        let mut data = self.data.write().await;
        data.state.pending_input = entry.to_string();
        data.state.is_recent_searches_panel_open = false;
        self.publish(SessionEvent::StateChanged(data.state.clone()));
    }

    /// Selects the recent search at `index` (0 = most recent).
    ///
    /// Returns `false` if there is no such entry.
    pub async fn select_recent_search_at(&self, index: usize) -> bool {
        let entry = match self.data.read().await.recent_searches.get(index) {
            Some(entry) => entry.to_string(),
            None => return false,
        };
        self.select_recent_search(&entry).await;
        true
    }

    pub async fn toggle_recent_searches_panel(&self) {
        let mut data = self.data.write().await;
        data.state.is_recent_searches_panel_open = !data.state.is_recent_searches_panel_open;
        self.publish(SessionEvent::StateChanged(data.state.clone()));
    }

    pub async fn close_recent_searches_panel(&self) {
        let mut data = self.data.write().await;
        if !data.state.is_recent_searches_panel_open {
            return;
        }
        data.state.is_recent_searches_panel_open = false;
        self.publish(SessionEvent::StateChanged(data.state.clone()));
    }

    fn spawn_completion(
        &self,
        request_id: u64,
        question: String,
        token: CancellationToken,
    ) -> CompletionHandle {
        let controller = self.clone();
        let task_token = token.clone();
        let join = tokio::spawn(async move {
            let outcome = controller.run_completion(&question, &task_token).await;
            controller.finish_request(request_id, outcome).await;
        });

        CompletionHandle { token, join }
    }

    async fn run_completion(
        &self,
        question: &str,
        token: &CancellationToken,
    ) -> Result<String, CompletionError> {
        let call = async {
            match self.request_timeout {
                Some(limit) => tokio::time::timeout(limit, self.client.complete(question))
                    .await
                    .unwrap_or_else(|_| Err(CompletionError::timed_out(limit))),
                None => self.client.complete(question).await,
            }
        };

        tokio::select! {
            _ = token.cancelled() => Err(CompletionError::cancelled()),
            outcome = call => outcome,
        }
    }

    async fn finish_request(&self, request_id: u64, outcome: Result<String, CompletionError>) {
        let mut data = self.data.write().await;
        let is_current = data
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.request_id == request_id);
        if !is_current {
            debug!(request_id, "Discarding outcome of an already resolved request");
            return;
        }
        data.in_flight = None;
        self.apply_outcome(&mut data, request_id, outcome);
    }

    fn apply_outcome(
        &self,
        data: &mut SessionData,
        request_id: u64,
        outcome: Result<String, CompletionError>,
    ) {
        let text = match outcome {
            Ok(text) => text,
            Err(err) => {
                error!(request_id, error = %err, "Completion request failed");
                APOLOGY_MESSAGE.to_string()
            }
        };

        let message = ChatMessage::new(Sender::Bot, text);
        data.transcript.push(message.clone());
        data.state.mode = AppMode::Idle;

        self.publish(SessionEvent::MessageAppended(message));
        self.publish(SessionEvent::StateChanged(data.state.clone()));
        info!(
            request_id,
            transcript_len = data.transcript.len(),
            "Completion resolved, back to idle"
        );
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

/// Handle to the background task running one completion call.
///
/// Dropping the handle detaches the task; the request still resolves.
#[derive(Debug)]
pub struct CompletionHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl CompletionHandle {
    /// Aborts the call. The request resolves as a failure.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits until the request has been resolved into the transcript.
    pub async fn wait(self) {
        if let Err(err) = self.join.await {
            warn!(error = %err, "Completion task did not finish cleanly");
        }
    }
}
