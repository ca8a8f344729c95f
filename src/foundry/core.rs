//! Client for a hosted chat completions deployment (Azure AI Foundry
//! style). One request in, one reply out.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::{ApiKey, AppConfig};

pub const API_VERSION: &str = "2024-10-21";
pub const FALLBACK_REPLY: &str = "No response received.";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Request to completion endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Foundry API returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Unexpected response from completion endpoint: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's content from a completion response
/// body. Missing fields fall back to `FALLBACK_REPLY`; a body that
/// isn't a JSON object is an error.
pub fn first_choice_content(body: &str) -> Result<String, RelayError> {
    let resp: CompletionResponse = serde_json::from_str(body)?;
    let content = resp
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|msg| msg.content)
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());
    Ok(content)
}

/// Anything that can turn a transcript into the next assistant
/// reply.
#[async_trait]
pub trait CompletionClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, RelayError>;
}

pub type SharedCompletionClient = Arc<dyn CompletionClient + Send + Sync + 'static>;

#[derive(Clone, Debug)]
pub struct FoundryClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    deployment: String,
    max_tokens: u32,
    temperature: f64,
}

impl FoundryClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            API_VERSION
        )
    }
}

#[async_trait]
impl CompletionClient for FoundryClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, RelayError> {
        let payload = json!({
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        tracing::info!(
            "Sending chat request to {} deployment {}",
            self.endpoint,
            self.deployment
        );

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", self.api_key.expose())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Foundry API error {}: {}", status, body);
            return Err(RelayError::Upstream { status, body });
        }

        first_choice_content(&body)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn test_client(url: &str) -> FoundryClient {
        FoundryClient::new(&AppConfig::new(url, "test-key"))
    }

    fn completions_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/openai/deployments/Phi-4/chat/completions")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "2024-10-21".into(),
            ))
    }

    #[test]
    fn test_message_serializes_role_and_content_only() {
        let msg = Message::new(Role::Assistant, "Hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"role": "assistant", "content": "Hello"}));
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let mut config = AppConfig::new("https://example.services.ai.azure.com/", "k");
        config.deployment = String::from("gpt-4o");
        let client = FoundryClient::new(&config);
        assert_eq!(
            client.completions_url(),
            "https://example.services.ai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_first_choice_content_empty_choices() {
        let content = first_choice_content(r#"{"choices": []}"#).unwrap();
        assert_eq!(content, FALLBACK_REPLY);
    }

    #[test]
    fn test_first_choice_content_missing_fields() {
        assert_eq!(first_choice_content("{}").unwrap(), FALLBACK_REPLY);
        assert_eq!(
            first_choice_content(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap(),
            FALLBACK_REPLY
        );
        assert_eq!(
            first_choice_content(r#"{"choices": [{"index": 0}]}"#).unwrap(),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn test_first_choice_content_uses_first_choice() {
        let body = r#"{"choices": [
            {"message": {"role": "assistant", "content": "first"}},
            {"message": {"role": "assistant", "content": "second"}}
        ]}"#;
        assert_eq!(first_choice_content(body).unwrap(), "first");
    }

    #[test]
    fn test_first_choice_content_not_json() {
        let result = first_choice_content("<html>gateway timeout</html>");
        assert!(matches!(result, Err(RelayError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1694268190,
            "model": "Phi-4",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello!"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let mock = completions_mock(&mut server)
            .match_header("api-key", "test-key")
            .match_body(Matcher::Json(json!({
                "messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hey"},
                    {"role": "user", "content": "How are you?"}
                ],
                "max_tokens": 800,
                "temperature": 0.7
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create_async()
            .await;

        let messages = vec![
            Message::new(Role::User, "Hi"),
            Message::new(Role::Assistant, "Hey"),
            Message::new(Role::User, "How are you?"),
        ];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let mut server = mockito::Server::new_async().await;

        let mock = completions_mock(&mut server)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_complete_upstream_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = completions_mock(&mut server)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        match result {
            Err(RelayError::Upstream { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("Expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mut server = mockito::Server::new_async().await;

        let _mock = completions_mock(&mut server)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&server.url()).complete(&messages).await;

        assert!(matches!(result, Err(RelayError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_complete_transport_error() {
        // Nothing listens on port 1
        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client("http://127.0.0.1:1").complete(&messages).await;

        assert!(matches!(result, Err(RelayError::Transport(_))));
    }
}
