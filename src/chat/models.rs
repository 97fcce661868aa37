//! The core models for a chat transcript.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Ordered, append-only list of messages for the active
/// conversation. Only the last message is ever edited in place, and
/// only while a response is streaming into it.
#[derive(Default, Clone, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn append(&mut self, role: Role, content: &str) {
        self.push(Message::new(role, content))
    }

    /// Replace the content of the final message. Does nothing on an
    /// empty transcript.
    pub fn update_last(&mut self, content: &str) {
        if let Some(last) = self.0.last_mut() {
            last.content = content.to_string();
        }
    }

    pub fn replace_all(&mut self, history: Vec<Message>) {
        self.0 = history;
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new())
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
