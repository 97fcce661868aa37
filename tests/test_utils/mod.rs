//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};

use streamchat::api::agent::Agent;
use streamchat::api::{AppState, app};
use streamchat::core::{AppConfig, Notices};

/// Config for tests, never read from the environment so tests can
/// run in parallel. The mock agent streams without delays.
pub fn test_config() -> AppConfig {
    AppConfig {
        api_url: String::from("http://127.0.0.1:8000/chat"),
        request_timeout: Duration::from_secs(10),
        notices: Notices::default(),
        agent_delay: Duration::ZERO,
    }
}

/// Creates a test application router backed by the mock agent.
pub fn test_app() -> Router {
    app(Arc::new(RwLock::new(AppState::new(&test_config()))))
}

/// Same as `test_app` but answering with the given agent.
pub fn test_app_with_agent(agent: Arc<dyn Agent>) -> Router {
    let state = AppState::new(&test_config()).with_agent(agent);
    app(Arc::new(RwLock::new(state)))
}

/// Serve `app` on a random local port and return the chat endpoint
/// URL. The server runs until the test's runtime shuts down.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/chat", addr)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
