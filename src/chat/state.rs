//! Observable state of a chat: the transcript plus the transient
//! loading and status flags, and the handle of the request that is
//! currently streaming into it.
use futures::future::AbortHandle;
use tokio::sync::mpsc;

use super::models::{Message, Role, Transcript};

/// Notifications for whatever is rendering the chat. Each one is sent
/// right after the mutation it describes, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatUpdate {
    MessageAppended(Message),
    LastMessageUpdated(String),
    TranscriptReplaced(Vec<Message>),
    Status(String),
    Loading(bool),
}

#[derive(Debug)]
struct ActiveTurn {
    id: u64,
    handle: AbortHandle,
}

#[derive(Default, Debug)]
pub struct ChatState {
    transcript: Transcript,
    loading: bool,
    status: String,
    active_turn: Option<ActiveTurn>,
    next_turn_id: u64,
    updates: Option<mpsc::UnboundedSender<ChatUpdate>>,
}

impl ChatState {
    pub fn new(updates: Option<mpsc::UnboundedSender<ChatUpdate>>) -> Self {
        Self {
            updates,
            ..Default::default()
        }
    }

    fn emit(&self, update: ChatUpdate) {
        if let Some(tx) = &self.updates {
            // Nobody listening is fine, the state is still readable
            let _ = tx.send(update);
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn append(&mut self, role: Role, content: &str) {
        let msg = Message::new(role, content);
        self.transcript.push(msg.clone());
        self.emit(ChatUpdate::MessageAppended(msg));
    }

    pub fn update_last(&mut self, content: &str) {
        if self.transcript.is_empty() {
            return;
        }
        self.transcript.update_last(content);
        self.emit(ChatUpdate::LastMessageUpdated(content.to_string()));
    }

    pub fn replace_all(&mut self, history: Vec<Message>) {
        self.transcript.replace_all(history.clone());
        self.emit(ChatUpdate::TranscriptReplaced(history));
    }

    pub fn set_status(&mut self, status: &str) {
        if self.status == status {
            return;
        }
        self.status = status.to_string();
        self.emit(ChatUpdate::Status(self.status.clone()));
    }

    pub fn clear_status(&mut self) {
        self.set_status("");
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading == loading {
            return;
        }
        self.loading = loading;
        self.emit(ChatUpdate::Loading(loading));
    }

    /// Register the handle for a new turn and return the turn's id.
    /// Any turn still in flight is aborted first so there is never
    /// more than one live handle.
    pub fn begin_turn(&mut self, handle: AbortHandle) -> u64 {
        if self.abort_turn() {
            tracing::debug!("Aborted previous turn before starting a new one");
        }
        self.next_turn_id += 1;
        let id = self.next_turn_id;
        self.active_turn = Some(ActiveTurn { id, handle });
        id
    }

    /// Abort and release the current handle. Returns whether there
    /// was one.
    pub fn abort_turn(&mut self) -> bool {
        match self.active_turn.take() {
            Some(turn) => {
                turn.handle.abort();
                tracing::debug!("Aborted turn {}", turn.id);
                true
            }
            None => false,
        }
    }

    pub fn has_active_turn(&self) -> bool {
        self.active_turn.is_some()
    }

    /// True while `id` still owns the chat. A turn loses ownership
    /// when it is stopped, replaced or a session is loaded.
    pub fn is_active(&self, id: u64) -> bool {
        self.active_turn.as_ref().is_some_and(|t| t.id == id)
    }

    /// End of a turn by any path. Only the turn that owns the chat
    /// resets it, a stale turn leaves its successor alone.
    pub fn finish_turn(&mut self, id: u64) {
        if !self.is_active(id) {
            return;
        }
        self.active_turn = None;
        self.set_loading(false);
        self.clear_status();
    }
}
