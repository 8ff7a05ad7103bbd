//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: Chat message types (`Sender`, `ChatMessage`)
//! - `transcript`: Append-only message list (`Transcript`)
//! - `recent_searches`: Bounded most-recent-first input history (`RecentSearches`)
//! - `app_mode`: Session state types (`AppMode`, `SessionState`)
//! - `event`: Change notifications (`SessionEvent`)
//! - `controller`: Single-flight state machine (`SessionController`)

mod app_mode;
mod controller;
mod event;
mod message;
mod recent_searches;
mod transcript;

pub use app_mode::{AppMode, SessionState};
pub use controller::{
    APOLOGY_MESSAGE, CompletionHandle, ControllerOptions, SessionController, SessionSnapshot,
};
pub use event::SessionEvent;
pub use message::{ChatMessage, Sender};
pub use recent_searches::{RECENT_SEARCHES_CAPACITY, RecentSearches};
pub use transcript::{GREETING_MESSAGE, Transcript};
