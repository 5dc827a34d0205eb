use super::Session;
use std::collections::HashMap;
use std::sync::Mutex;

/// Session lifecycle, injected into the orchestrator so tests can use a fake.
///
/// The store hands out owned snapshots; callers mutate their copy and
/// `replace` it. Only the dispatch loop writes during collection, and a
/// generating session is only touched by its own task, so last-write-wins is
/// sufficient.
pub trait SessionStore: Send + Sync {
    /// Create a fresh session for the conversation, replacing any existing one.
    fn create(&self, chat_id: &str) -> Session;

    /// Snapshot of the current session, if any.
    fn get(&self, chat_id: &str) -> Option<Session>;

    /// Put a mutated snapshot back.
    fn replace(&self, session: Session);

    /// Drop the session. Returns whether one existed.
    fn discard(&self, chat_id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store; sessions do not survive a restart by design.
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        // A poisoned map only means another task panicked mid-insert; the
        // data is still a valid map.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, chat_id: &str) -> Session {
        let session = Session::new(chat_id);
        self.lock().insert(chat_id.to_string(), session.clone());
        session
    }

    fn get(&self, chat_id: &str) -> Option<Session> {
        self.lock().get(chat_id).cloned()
    }

    fn replace(&self, session: Session) {
        self.lock().insert(session.chat_id.clone(), session);
    }

    fn discard(&self, chat_id: &str) -> bool {
        self.lock().remove(chat_id).is_some()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
