//! Append-only list of chat messages.

use serde::Serialize;

use super::message::ChatMessage;

/// Synthetic first message of every session.
pub const GREETING_MESSAGE: &str =
    "Hello! I'm AG TECH, your electrical systems assistant. How can I help you today?";

/// Ordered messages in display order.
///
/// The only mutation is [`Transcript::push`]; messages are never edited or
/// removed, so the length only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates a transcript holding only the bot greeting.
    pub fn seeded() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING_MESSAGE)],
        }
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Sender;

    #[test]
    fn test_seeded_transcript_starts_with_greeting() {
        let transcript = Transcript::seeded();

        assert_eq!(transcript.len(), 1);
        let greeting = transcript.last().unwrap();
        assert_eq!(greeting.sender(), Sender::Bot);
        assert_eq!(greeting.text(), GREETING_MESSAGE);
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut transcript = Transcript::seeded();
        transcript.push(ChatMessage::user("first"));
        transcript.push(ChatMessage::bot("second"));

        let texts: Vec<&str> = transcript.iter().map(ChatMessage::text).collect();
        assert_eq!(texts, vec![GREETING_MESSAGE, "first", "second"]);
    }
}
