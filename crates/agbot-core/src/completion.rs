//! Seam between the session controller and a remote completion service.

use async_trait::async_trait;

use crate::error::CompletionError;

/// Given a question, produce the model's text completion.
///
/// Implementations build whatever prompt their endpoint needs, perform a
/// single call and return the completion verbatim. They hold no per-session
/// state and must not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, question: &str) -> Result<String, CompletionError>;
}
