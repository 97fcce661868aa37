//! Reply generators for the chat endpoint.
use std::time::Duration;

use anyhow::{Error, Result};
use async_stream::stream;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::sync::mpsc;

use crate::chat::StreamEvent;

/// Something that can answer a chat message one chunk at a time.
pub trait Agent: Send + Sync {
    fn reply(&self, query: &str) -> BoxStream<'static, Result<String, Error>>;
}

/// Canned reply streamed word by word. Stands in for a real model.
#[derive(Clone, Debug)]
pub struct MockAgent {
    word_delay: Duration,
}

impl MockAgent {
    pub fn new(word_delay: Duration) -> Self {
        Self { word_delay }
    }
}

pub fn mock_reply(query: &str) -> String {
    format!(
        "I received your query: '{}'.\n\n\
         Here is a simulated streaming response from the backend. \
         I am sending this text in small chunks to demonstrate the \
         Server-Sent Events (SSE) capability.\n\n\
         1. First point\n\
         2. Second point\n\
         3. Final conclusion.",
        query
    )
}

impl Agent for MockAgent {
    fn reply(&self, query: &str) -> BoxStream<'static, Result<String, Error>> {
        let reply = mock_reply(query);
        let delay = self.word_delay;
        let words = stream! {
            for word in reply.split(' ') {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield Ok::<String, Error>(format!("{} ", word));
            }
        };
        words.boxed()
    }
}

/// Pause between the status updates sent before the reply starts.
#[derive(Clone, Copy, Debug)]
pub struct Stages {
    pub delay: Duration,
}

const STAGES: [&str; 3] = [
    "Analyzing query...",
    "Searching knowledge base...",
    "Generating response...",
];

/// Produce the full event sequence for one query: status updates,
/// the reply as content events, then `done`. A failing agent ends the
/// sequence with an `error` event instead. Stops early once the
/// receiving side hangs up.
pub async fn generate_events(
    tx: mpsc::UnboundedSender<StreamEvent>,
    agent: &dyn Agent,
    query: &str,
    stages: Stages,
) {
    for (i, stage) in STAGES.iter().enumerate() {
        if tx.send(StreamEvent::status(stage)).is_err() {
            return;
        }
        if i + 1 < STAGES.len() && !stages.delay.is_zero() {
            tokio::time::sleep(stages.delay).await;
        }
    }

    let mut chunks = agent.reply(query);
    while let Some(chunk) = chunks.next().await {
        let event = match chunk {
            Ok(text) if text.is_empty() => continue,
            Ok(text) => StreamEvent::content(&text),
            Err(e) => {
                tracing::error!("Agent failed: {}", e);
                let _ = tx.send(StreamEvent::error(&e.to_string()));
                return;
            }
        };
        if tx.send(event).is_err() {
            tracing::info!("Client disconnected, stopping generation");
            return;
        }
    }

    let _ = tx.send(StreamEvent::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use futures_util::stream;

    struct BrokenAgent;

    impl Agent for BrokenAgent {
        fn reply(&self, _query: &str) -> BoxStream<'static, Result<String, Error>> {
            stream::iter(vec![Ok("partial ".to_string()), Err(anyhow!("model crashed"))]).boxed()
        }
    }

    async fn collect(agent: &dyn Agent, query: &str) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        generate_events(tx, agent, query, Stages { delay: Duration::ZERO }).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_mock_agent_event_sequence() {
        let events = collect(&MockAgent::new(Duration::ZERO), "hello").await;

        assert_eq!(events[0], StreamEvent::status("Analyzing query..."));
        assert_eq!(events[2], StreamEvent::status("Generating response..."));
        assert_eq!(events.last(), Some(&StreamEvent::Done));

        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Content { text } => text.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(text, format!("{} ", mock_reply("hello")));
    }

    #[tokio::test]
    async fn test_failing_agent_ends_with_error() {
        let events = collect(&BrokenAgent, "hello").await;

        assert_eq!(events[3], StreamEvent::content("partial "));
        assert_eq!(events.last(), Some(&StreamEvent::error("model crashed")));
        assert!(!events.contains(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        // Returns instead of generating into the void
        let stages = Stages {
            delay: Duration::ZERO,
        };
        generate_events(tx, &MockAgent::new(Duration::ZERO), "hello", stages).await;
    }
}
