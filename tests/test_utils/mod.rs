//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Response};
use http::StatusCode;

use chatrelay::api::AppState;
use chatrelay::api::app;
use chatrelay::chat::{ChatService, MemorySessionStore};
use chatrelay::core::AppConfig;
use chatrelay::foundry::{CompletionClient, Message, RelayError, SharedCompletionClient};

/// Completion client that always replies with the same text
pub struct FixedReply(pub String);

#[async_trait]
impl CompletionClient for FixedReply {
    async fn complete(&self, _messages: &[Message]) -> Result<String, RelayError> {
        Ok(self.0.clone())
    }
}

/// Completion client that always fails like a rejected API key
pub struct Unauthorized;

#[async_trait]
impl CompletionClient for Unauthorized {
    async fn complete(&self, _messages: &[Message]) -> Result<String, RelayError> {
        Err(RelayError::Upstream {
            status: StatusCode::UNAUTHORIZED,
            body: String::from("unauthorized"),
        })
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::new("http://localhost:9999", "test-api-key")
}

/// Creates a test application router using the given completion
/// client and a fresh in-memory session store.
pub fn test_app_with_client(client: SharedCompletionClient) -> Router {
    let config = test_config();
    let sessions = Arc::new(MemorySessionStore::new(config.session_idle_timeout));
    let app_state = AppState::new(ChatService::new(client, sessions), config);
    app(Arc::new(RwLock::new(app_state)))
}

/// Creates a test application router whose model always replies
/// "Hello".
pub fn test_app() -> Router {
    test_app_with_client(Arc::new(FixedReply(String::from("Hello"))))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the session cookie set on a response, for
/// passing back in a `cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("chatrelay_session="))
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}
