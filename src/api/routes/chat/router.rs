//! Router for the chat API

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::post,
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::public;
use crate::api::agent::generate_events;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::StreamEvent;

type SharedState = Arc<RwLock<AppState>>;

fn to_sse_event(event: StreamEvent) -> Event {
    match serde_json::to_string(&event) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            // Only `Unknown` can't be serialized and it is never sent
            tracing::error!("Failed to serialize event {:?}: {}", event, e);
            Event::default().comment("unserializable event")
        }
    }
}

/// Answer a message with a stream of status, content and done events
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }

    let (agent, stages) = {
        let shared_state = state.read().expect("Unable to read share state");
        (Arc::clone(&shared_state.agent), shared_state.stages)
    };

    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
    let sse_stream =
        UnboundedReceiverStream::new(rx).map(|event| Ok::<Event, Infallible>(to_sse_event(event)));

    tracing::debug!("Received chat message: {}", payload.message);

    // Generate the reply in the background. Dropping the response
    // stream closes the channel which stops generation.
    tokio::spawn(async move {
        generate_events(tx, agent.as_ref(), &payload.message, stages).await;
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default().text("keep-alive")))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
