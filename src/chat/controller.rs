use std::sync::{Arc, RwLock, RwLockWriteGuard};

use anyhow::Error;
use futures::future::{AbortHandle, Abortable, Aborted};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::decoder::LineDecoder;
use super::events::{Frame, parse_frame};
use super::models::{Message, Role};
use super::state::{ChatState, ChatUpdate};
use super::transport::Transport;
use super::turn::StreamTurn;
use crate::core::Notices;

/// How a call to `send_message` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, nothing was sent
    Ignored,
    /// The response stream ran to its end
    Completed,
    /// The request or the stream failed
    Failed,
    /// Aborted by `stop_generation`, `load_session` or a newer message
    Cancelled,
    /// Lost ownership of the chat without being polled to abortion
    Superseded,
}

/// Drives a chat against a streaming backend.
///
/// Each call to `send_message` is one turn: the user message is added
/// to the transcript, a request is opened through the `Transport` and
/// the response is decoded line by line into events that build up the
/// assistant's reply. At most one turn is in flight at a time and it
/// can be cancelled from another task with `stop_generation` or by
/// switching sessions with `load_session`.
///
/// The controller is cheap to clone, clones share the same state.
///
/// Use `ChatController::builder()` to construct one.
#[derive(Clone)]
pub struct ChatController {
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<ChatState>>,
    notices: Notices,
}

impl ChatController {
    pub fn builder<T: Transport + 'static>(transport: T) -> ChatControllerBuilder {
        ChatControllerBuilder::new(transport)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.state.write().expect("Unable to write chat state")
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state
            .read()
            .expect("Unable to read chat state")
            .transcript()
            .messages()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().expect("Unable to read chat state").is_loading()
    }

    pub fn status(&self) -> String {
        self.state
            .read()
            .expect("Unable to read chat state")
            .status()
            .to_string()
    }

    /// True while a request is outstanding.
    pub fn is_streaming(&self) -> bool {
        self.state
            .read()
            .expect("Unable to read chat state")
            .has_active_turn()
    }

    /// Send a user message and stream the reply into the transcript.
    /// Resolves once the turn is over, whichever way it ended. All
    /// failures are reported in the transcript, never to the caller.
    pub async fn send_message(&self, text: &str) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        let (handle, registration) = AbortHandle::new_pair();
        let turn_id = {
            let mut state = self.write();
            let id = state.begin_turn(handle);
            state.append(Role::User, text);
            state.set_loading(true);
            state.set_status(&self.notices.initializing);
            id
        };
        tracing::debug!("Starting turn {}", turn_id);

        let result = Abortable::new(self.stream_turn(turn_id, text), registration).await;
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => self.handle_transport_error(turn_id, e),
            Err(Aborted) => {
                tracing::debug!("Turn {} aborted", turn_id);
                TurnOutcome::Cancelled
            }
        };

        // Always runs, regardless of how the turn ended
        self.write().finish_turn(turn_id);
        tracing::debug!("Finished turn {}: {:?}", turn_id, outcome);

        outcome
    }

    async fn stream_turn(&self, turn_id: u64, text: &str) -> Result<TurnOutcome, Error> {
        let mut stream = self.transport.open(text).await?;
        let mut decoder = LineDecoder::new();
        let mut turn = StreamTurn::new();

        // Termination is the body closing, not the `done` event
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for line in decoder.push(&chunk) {
                if !self.dispatch(turn_id, &mut turn, &line) {
                    return Ok(TurnOutcome::Superseded);
                }
            }
        }

        if let Some(line) = decoder.finish() {
            if !self.dispatch(turn_id, &mut turn, &line) {
                return Ok(TurnOutcome::Superseded);
            }
        }

        Ok(TurnOutcome::Completed)
    }

    /// Apply one decoded line to the chat. Returns `false` once the
    /// turn no longer owns the chat and must stop.
    fn dispatch(&self, turn_id: u64, turn: &mut StreamTurn, line: &str) -> bool {
        let event = match parse_frame(line) {
            Frame::Event(event) => event,
            Frame::Malformed | Frame::Ignored => return true,
        };

        let mut state = self.write();
        if !state.is_active(turn_id) {
            tracing::debug!("Dropping event for stale turn {}", turn_id);
            return false;
        }
        turn.apply(event, &mut state);
        true
    }

    fn handle_transport_error(&self, turn_id: u64, e: Error) -> TurnOutcome {
        let mut state = self.write();
        if !state.is_active(turn_id) {
            tracing::debug!("Ignoring error for stale turn {}: {}", turn_id, e);
            return TurnOutcome::Superseded;
        }
        tracing::error!("Connection error: {}. Root cause: {}", e, e.root_cause());
        state.append(Role::Assistant, &self.notices.connection_error);
        TurnOutcome::Failed
    }

    /// Abort the outstanding request, if any, and leave a notice in the
    /// transcript. The notice is added even when nothing was running.
    pub fn stop_generation(&self) {
        let mut state = self.write();
        if state.abort_turn() {
            tracing::debug!("Generation stopped by user");
        }
        state.set_loading(false);
        state.clear_status();
        state.append(Role::System, &self.notices.stopped);
    }

    /// Switch to another conversation. A running turn is aborted first
    /// so it can't write into the newly loaded transcript.
    pub fn load_session(&self, history: Vec<Message>) {
        let mut state = self.write();
        state.abort_turn();
        state.set_loading(false);
        state.clear_status();
        state.replace_all(history);
    }

    pub fn clear_chat(&self) {
        self.load_session(Vec::new());
    }
}

pub struct ChatControllerBuilder {
    transport: Arc<dyn Transport>,
    notices: Notices,
    history: Vec<Message>,
    updates: Option<mpsc::UnboundedSender<ChatUpdate>>,
}

impl ChatControllerBuilder {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            notices: Notices::default(),
            history: Vec::new(),
            updates: None,
        }
    }

    pub fn build(self) -> ChatController {
        let mut state = ChatState::new(self.updates);
        if !self.history.is_empty() {
            state.replace_all(self.history);
        }
        ChatController {
            transport: self.transport,
            state: Arc::new(RwLock::new(state)),
            notices: self.notices,
        }
    }

    pub fn notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }

    pub fn transcript(mut self, messages: Vec<Message>) -> Self {
        self.history = messages;
        self
    }

    /// Receive a `ChatUpdate` for every change to the chat state.
    pub fn updates(mut self, transmitter: mpsc::UnboundedSender<ChatUpdate>) -> Self {
        self.updates = Some(transmitter);
        self
    }
}
