use serde::Serialize;

use super::{ChatMessage, SessionState};

/// Change notifications published by the session controller.
///
/// Each event is sent after the mutation it describes has been applied, so a
/// subscriber that reacts by taking a snapshot always sees the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript.
    MessageAppended(ChatMessage),
    /// The recent-searches list changed; carries the new list.
    RecentSearchesChanged(Vec<String>),
    /// Pending input, mode or panel visibility changed; carries the new state.
    StateChanged(SessionState),
}
