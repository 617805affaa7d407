use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::ChatMessage;

/// Messages sent to the assistant. Starts with the system prompt and only grows.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Routine,
    Notice,
    Pending,
    Error,
}

impl EntryKind {
    /// Heading shown in front of the entry text.
    pub fn label(self) -> Option<&'static str> {
        match self {
            EntryKind::User => Some("You:"),
            EntryKind::Assistant => Some("L'Oréal Assistant:"),
            EntryKind::Routine => Some("Your L'Oréal Routine:"),
            EntryKind::Notice | EntryKind::Pending | EntryKind::Error => None,
        }
    }

    /// Whether the text is model output rendered as Markdown.
    pub fn is_reply(self) -> bool {
        matches!(self, EntryKind::Assistant | EntryKind::Routine)
    }
}

/// One displayed chat line.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// What the chat window shows. Unlike [`Conversation`] it also holds
/// notices, in-flight markers, and error lines.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(TranscriptEntry {
            id,
            kind,
            text: text.into(),
            at: Utc::now(),
        });
        id
    }

    /// Drop an entry by id. Returns whether it was present.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
