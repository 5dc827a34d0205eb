pub mod collector;
pub mod store;


pub use store::{InMemorySessionStore, SessionStore};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Where a conversation stands in the collection dialogue.
///
/// Transitions move strictly forward one step at a time; `Aborted` is
/// reachable from any non-terminal state via `/cancel` or abandonment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DialogState {
    AwaitingTitle,
    AwaitingAuthors,
    AwaitingPageCount,
    Ready,
    Generating,
    Done,
    Aborted,
}

impl DialogState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// One parsed author record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub department: String,
    pub institution: String,
    pub city: String,
    pub email: String,
}

/// Per-conversation state: collected fields plus the dialogue position.
/// Ephemeral and in-memory only; discarded when the conversation completes
/// or is abandoned.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub chat_id: String,
    pub state: DialogState,
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub pages: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            state: DialogState::AwaitingTitle,
            title: None,
            authors: Vec::new(),
            pages: None,
            created_at: Utc::now(),
        }
    }

    /// All fields present and validated; generation may start.
    pub fn is_ready(&self) -> bool {
        self.state == DialogState::Ready
            && self.title.as_deref().is_some_and(|t| !t.is_empty())
            && !self.authors.is_empty()
            && self.pages.is_some()
    }
}
