use std::sync::Arc;

use anyhow::{Error, Result};

use super::models::Transcript;
use super::session::SessionStore;
use crate::foundry::{Message, Role, SharedCompletionClient};

/// Session key the transcript is stored under
pub const SESSION_KEY_MESSAGES: &str = "ChatMessages";

pub type SharedSessionStore = Arc<dyn SessionStore + Send + Sync + 'static>;

/// Runs chat turns against a completion client and keeps each
/// session's transcript in a `SessionStore`.
///
/// Failures talking to the completion endpoint never fail a turn.
/// They are written into the transcript as the assistant's reply
/// instead.
#[derive(Clone)]
pub struct ChatService {
    client: SharedCompletionClient,
    sessions: SharedSessionStore,
}

impl ChatService {
    pub fn new(client: SharedCompletionClient, sessions: SharedSessionStore) -> Self {
        Self { client, sessions }
    }

    /// Stored transcript for the session, empty if there is none.
    pub async fn show(&self, session_id: &str) -> Result<Transcript, Error> {
        self.load(session_id).await
    }

    /// Send the user's message and append the reply. Blank messages
    /// leave the transcript untouched.
    pub async fn send(&self, session_id: &str, user_text: &str) -> Result<Transcript, Error> {
        let mut transcript = self.load(session_id).await?;

        if user_text.trim().is_empty() {
            return Ok(transcript);
        }

        transcript.push(Message::new(Role::User, user_text));

        tracing::info!("Sending user message to Foundry endpoint");
        let reply = match self.client.complete(transcript.messages()).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Error calling Foundry endpoint: {}", e);
                format!("Error: {}", e)
            }
        };
        transcript.push(Message::new(Role::Assistant, &reply));

        self.sessions
            .save(session_id, SESSION_KEY_MESSAGES, transcript.to_json()?)
            .await?;

        Ok(transcript)
    }

    pub async fn clear(&self, session_id: &str) -> Result<(), Error> {
        self.sessions.remove(session_id, SESSION_KEY_MESSAGES).await
    }

    async fn load(&self, session_id: &str) -> Result<Transcript, Error> {
        let stored = self.sessions.load(session_id, SESSION_KEY_MESSAGES).await?;
        let transcript = match stored.as_deref() {
            None | Some("") => Transcript::new(),
            Some(json) => Transcript::from_json(json).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable transcript for session: {}", e);
                Transcript::new()
            }),
        };
        Ok(transcript)
    }
}
