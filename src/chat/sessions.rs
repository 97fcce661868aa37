//! The list of conversations a user can switch between.
//!
//! Sessions only live in memory. The chat controller holds the
//! transcript of the active session while it is being used and the
//! list is brought up to date with `sync_active` after each turn.
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{Message, Role};

pub const DEFAULT_TITLE: &str = "New Chat";
const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: SessionId::new_v4(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Title derived from the first user message, truncated on a
/// character boundary.
pub fn title_from_messages(messages: &[Message]) -> Option<String> {
    let first = messages.iter().find(|m| m.role == Role::User)?;
    let mut title: String = first.content.chars().take(TITLE_MAX_CHARS).collect();
    if first.content.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    Some(title)
}

/// Newest first. There is always at least one session and exactly
/// one of them is active.
#[derive(Debug)]
pub struct SessionList {
    sessions: Vec<Session>,
    active: SessionId,
}

impl Default for SessionList {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionList {
    pub fn new() -> Self {
        let session = Session::new();
        let active = session.id;
        Self {
            sessions: vec![session],
            active,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_id(&self) -> SessionId {
        self.active
    }

    pub fn active(&self) -> Option<&Session> {
        self.get(self.active)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Session at a position in the list, as shown to the user.
    pub fn nth(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    /// Add an empty session at the top of the list and make it active.
    pub fn create(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id;
        self.sessions.insert(0, session);
        self.active = id;
        id
    }

    /// Make `id` the active session and return the history to load.
    /// `None` when the session doesn't exist or is already active.
    pub fn select(&mut self, id: SessionId) -> Option<Vec<Message>> {
        if id == self.active {
            return None;
        }
        let session = self.get(id)?;
        let messages = session.messages.clone();
        self.active = id;
        Some(messages)
    }

    pub fn rename(&mut self, id: SessionId, title: &str) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a session. When the active session is removed the first
    /// remaining one becomes active, or a fresh one is created if
    /// none are left, and its history is returned for loading.
    pub fn delete(&mut self, id: SessionId) -> Option<Vec<Message>> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before || id != self.active {
            return None;
        }

        match self.sessions.first() {
            Some(next) => {
                self.active = next.id;
                Some(next.messages.clone())
            }
            None => {
                self.create();
                Some(Vec::new())
            }
        }
    }

    /// Store the current transcript in the active session, naming it
    /// after the first user message if it still has the default title.
    pub fn sync_active(&mut self, messages: &[Message]) {
        let active = self.active;
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == active) else {
            return;
        };
        if session.title == DEFAULT_TITLE {
            if let Some(title) = title_from_messages(messages) {
                session.title = title;
            }
        }
        session.messages = messages.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_one_active_session() {
        let list = SessionList::new();
        assert_eq!(list.sessions().len(), 1);
        assert_eq!(list.active().unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_create_puts_new_session_first() {
        let mut list = SessionList::new();
        let first = list.active_id();
        let second = list.create();

        assert_ne!(first, second);
        assert_eq!(list.active_id(), second);
        assert_eq!(list.nth(0).unwrap().id, second);
        assert_eq!(list.nth(1).unwrap().id, first);
    }

    #[test]
    fn test_rapid_creation_has_unique_ids() {
        let mut list = SessionList::new();
        for _ in 0..100 {
            list.create();
        }
        let mut ids: Vec<String> = list.sessions().iter().map(|s| s.id.to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 101);
    }

    #[test]
    fn test_select_returns_history() {
        let mut list = SessionList::new();
        let first = list.active_id();
        let history = vec![Message::new(Role::User, "Hello")];
        list.sync_active(&history);
        list.create();

        assert_eq!(list.select(first), Some(history));
        assert_eq!(list.active_id(), first);
        // Already active
        assert_eq!(list.select(first), None);
    }

    #[test]
    fn test_sync_active_sets_title_once() {
        let mut list = SessionList::new();
        list.sync_active(&[
            Message::new(Role::System, "Generation stopped"),
            Message::new(Role::User, "What is the capital of France and why?"),
        ]);
        assert_eq!(list.active().unwrap().title, "What is the capital of France ...");

        list.sync_active(&[Message::new(Role::User, "Something else")]);
        assert_eq!(list.active().unwrap().title, "What is the capital of France ...");
    }

    #[test]
    fn test_short_title_has_no_ellipsis() {
        let title = title_from_messages(&[Message::new(Role::User, "Hi")]);
        assert_eq!(title, Some("Hi".to_string()));
        assert_eq!(title_from_messages(&[]), None);
    }

    #[test]
    fn test_rename() {
        let mut list = SessionList::new();
        let id = list.active_id();
        assert!(list.rename(id, "Trip planning"));
        assert_eq!(list.active().unwrap().title, "Trip planning");
        assert!(!list.rename(SessionId::new_v4(), "missing"));
    }

    #[test]
    fn test_delete_active_switches_to_first_remaining() {
        let mut list = SessionList::new();
        let older = list.active_id();
        list.sync_active(&[Message::new(Role::User, "older")]);
        let newer = list.create();

        let loaded = list.delete(newer);
        assert_eq!(loaded, Some(vec![Message::new(Role::User, "older")]));
        assert_eq!(list.active_id(), older);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut list = SessionList::new();
        let older = list.active_id();
        let newer = list.create();

        assert_eq!(list.delete(older), None);
        assert_eq!(list.active_id(), newer);
        assert_eq!(list.sessions().len(), 1);
    }

    #[test]
    fn test_delete_last_session_creates_new_one() {
        let mut list = SessionList::new();
        let only = list.active_id();

        assert_eq!(list.delete(only), Some(Vec::new()));
        assert_eq!(list.sessions().len(), 1);
        assert_ne!(list.active_id(), only);
        assert_eq!(list.active().unwrap().title, DEFAULT_TITLE);
    }
}
