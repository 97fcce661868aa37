use super::events::StreamEvent;
use super::models::Role;
use super::state::ChatState;

/// Per-turn bookkeeping for the assistant reply being streamed.
///
/// A fresh `StreamTurn` is created for every message sent and dropped
/// when its stream ends. `bubble_created` latches on the first event
/// that puts an assistant message in the transcript; after that every
/// content event rewrites that same message.
#[derive(Default, Debug)]
pub struct StreamTurn {
    accumulated: String,
    bubble_created: bool,
}

impl StreamTurn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn bubble_created(&self) -> bool {
        self.bubble_created
    }

    /// Apply a single event to the chat state.
    pub fn apply(&mut self, event: StreamEvent, state: &mut ChatState) {
        match event {
            StreamEvent::Status { text } => {
                state.set_status(text.as_deref().unwrap_or_default());
            }
            StreamEvent::Content { text } => {
                self.accumulated.push_str(text.as_deref().unwrap_or_default());
                if self.bubble_created {
                    state.update_last(&self.accumulated);
                } else {
                    state.append(Role::Assistant, &self.accumulated);
                    self.bubble_created = true;
                    state.clear_status();
                }
            }
            StreamEvent::Done => {
                // The read loop keeps going until the body closes
                state.set_loading(false);
                state.clear_status();
            }
            StreamEvent::Error { text } => {
                let text = text.unwrap_or_default();
                tracing::error!("Backend error: {}", text);
                if !self.bubble_created {
                    state.append(Role::Assistant, &format!("Error: {}", text));
                    self.bubble_created = true;
                }
            }
            StreamEvent::Unknown => {
                tracing::debug!("Ignoring event with unknown type");
            }
        }
    }
}
