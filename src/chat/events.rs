//! Event frames sent by the chat backend.
//!
//! Each frame is a single line of the form `data: <json>` where the
//! JSON payload carries a `type` field:
//!
//! ```text
//! data: {"type":"status","text":"Searching..."}
//! data: {"type":"content","text":"Hel"}
//! data: {"type":"done"}
//! data: {"type":"error","text":"boom"}
//! ```
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Status {
        #[serde(default)]
        text: Option<String>,
    },
    Content {
        #[serde(default)]
        text: Option<String>,
    },
    Done,
    Error {
        #[serde(default)]
        text: Option<String>,
    },
    // Anything the client doesn't know about is skipped
    #[serde(other)]
    #[serde(skip_serializing)]
    Unknown,
}

impl StreamEvent {
    pub fn status(text: &str) -> Self {
        Self::Status {
            text: Some(text.to_string()),
        }
    }

    pub fn content(text: &str) -> Self {
        Self::Content {
            text: Some(text.to_string()),
        }
    }

    pub fn error(text: &str) -> Self {
        Self::Error {
            text: Some(text.to_string()),
        }
    }

    /// Render the event as a complete frame including the trailing
    /// blank line separator.
    pub fn to_frame(&self) -> Result<String, Error> {
        Ok(format!("{}{}\n\n", DATA_PREFIX, serde_json::to_string(self)?))
    }
}

/// Result of classifying one decoded line.
#[derive(Debug, PartialEq)]
pub enum Frame {
    /// A `data: ` line holding a well formed event
    Event(StreamEvent),
    /// A `data: ` line whose payload could not be parsed
    Malformed,
    /// Blank separators, comments, keep-alives, `event:` lines
    Ignored,
}

pub fn parse_frame(line: &str) -> Frame {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Ignored;
    };

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Frame::Event(event),
        Err(e) => {
            tracing::warn!("Skipping malformed event frame {:?}: {}", payload, e);
            Frame::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_frame() {
        assert_eq!(
            parse_frame(r#"data: {"type":"status","text":"Analyzing query..."}"#),
            Frame::Event(StreamEvent::status("Analyzing query..."))
        );
    }

    #[test]
    fn test_parse_content_without_text() {
        assert_eq!(
            parse_frame(r#"data: {"type":"content"}"#),
            Frame::Event(StreamEvent::Content { text: None })
        );
        assert_eq!(
            parse_frame(r#"data: {"type":"content","text":null}"#),
            Frame::Event(StreamEvent::Content { text: None })
        );
    }

    #[test]
    fn test_parse_done_with_extra_fields() {
        assert_eq!(
            parse_frame(r#"data: {"type":"done","usage":{"tokens":3}}"#),
            Frame::Event(StreamEvent::Done)
        );
    }

    #[test]
    fn test_parse_unknown_type() {
        assert_eq!(
            parse_frame(r#"data: {"type":"heartbeat","text":"ping"}"#),
            Frame::Event(StreamEvent::Unknown)
        );
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(parse_frame("data: garbage-line"), Frame::Malformed));
        assert!(matches!(parse_frame(r#"data: {"text":"no type"}"#), Frame::Malformed));
        assert!(matches!(parse_frame("data: [DONE]"), Frame::Malformed));
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        assert_eq!(parse_frame(""), Frame::Ignored);
        assert_eq!(parse_frame(":keep-alive"), Frame::Ignored);
        assert_eq!(parse_frame("event: message"), Frame::Ignored);
        assert_eq!(parse_frame("garbage-line"), Frame::Ignored);
        // The prefix includes the space
        assert_eq!(parse_frame(r#"data:{"type":"done"}"#), Frame::Ignored);
    }

    #[test]
    fn test_to_frame() {
        assert_eq!(
            StreamEvent::content("Hi").to_frame().unwrap(),
            "data: {\"type\":\"content\",\"text\":\"Hi\"}\n\n"
        );
        assert_eq!(
            StreamEvent::Done.to_frame().unwrap(),
            "data: {\"type\":\"done\"}\n\n"
        );
    }
}
