//! Core of the AG Intelligent Bot.
//!
//! Holds the chat data model, the [`completion::CompletionClient`] seam, the
//! [`session::SessionController`] state machine and the markdown
//! [`render`]er. Nothing in this crate talks to the network or a terminal;
//! host shells drive the controller and draw what it exposes.

pub mod completion;
pub mod error;
pub mod render;
pub mod session;

pub use completion::CompletionClient;
pub use error::{AgbotError, CompletionError, Result};
