//! Chat message and transcript types.

use serde::{Deserialize, Serialize};

/// Persona directive seeding every transcript. Restricts the assistant to
/// eggplant topics.
pub const SYSTEM_PROMPT: &str = "You are an expert on eggplants and related topics like \
diseases, prevention, and cures. Do not answer unrelated questions.";

/// Who produced a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        write!(f, "{s}")
    }
}

/// One conversational turn. Serializes to the completion-service wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only ordered sequence of turns for one user.
///
/// Always begins with exactly one system message; the system head is never
/// removed or duplicated. The whole sequence is replaced on remote load and
/// overwritten wholesale on every persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// A fresh transcript seeded with the persona directive.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
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

    /// Append one turn.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the whole sequence with a remotely loaded copy.
    /// Empty payloads are ignored so a blank remote entry cannot strip the
    /// system head.
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        if messages.is_empty() {
            return;
        }
        self.messages = messages;
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
