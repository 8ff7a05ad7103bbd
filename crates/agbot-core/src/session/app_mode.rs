//! Session state types.

use serde::{Deserialize, Serialize};

/// Position in the single-flight state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppMode {
    /// Waiting for the user; submissions are accepted.
    #[default]
    Idle,
    /// A completion call is outstanding; submissions are dropped.
    AwaitingCompletion,
}

/// UI-facing state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Text currently in the input box.
    pub pending_input: String,
    pub mode: AppMode,
    /// Whether the recent-searches picker is shown. Display-only.
    pub is_recent_searches_panel_open: bool,
}

impl SessionState {
    pub fn is_request_in_flight(&self) -> bool {
        self.mode == AppMode::AwaitingCompletion
    }

    /// Whether a submit affordance should be enabled for the current input.
    pub fn can_submit(&self) -> bool {
        !self.is_request_in_flight() && !self.pending_input.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle_and_closed() {
        let state = SessionState::default();

        assert_eq!(state.mode, AppMode::Idle);
        assert!(!state.is_request_in_flight());
        assert!(!state.is_recent_searches_panel_open);
        assert!(state.pending_input.is_empty());
    }

    #[test]
    fn test_can_submit_requires_idle_and_text() {
        let mut state = SessionState {
            pending_input: "   ".to_string(),
            ..Default::default()
        };
        assert!(!state.can_submit());

        state.pending_input = "breaker sizing".to_string();
        assert!(state.can_submit());

        state.mode = AppMode::AwaitingCompletion;
        assert!(!state.can_submit());
    }
}
