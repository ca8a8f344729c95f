//! Router for the transcript API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use super::public;
use crate::api::state::AppState;
use crate::api::utils::session_id;
use crate::chat::ChatService;

type SharedState = Arc<RwLock<AppState>>;

fn chat_service(state: &SharedState) -> ChatService {
    state.read().expect("Unable to read share state").chat.clone()
}

/// Get the session's transcript
async fn transcript_get(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    let transcript = chat_service(&state).show(&session_id).await?;
    Ok((jar, Json(public::TranscriptResponse { transcript })))
}

/// Send a message and return the updated transcript
async fn transcript_send(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(payload): Json<public::SendRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    let transcript = chat_service(&state)
        .send(&session_id, &payload.message)
        .await?;
    Ok((jar, Json(public::TranscriptResponse { transcript })))
}

/// Clear the session's transcript
async fn transcript_clear(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    chat_service(&state).clear(&session_id).await?;
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Create the transcript router
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/",
        axum::routing::get(transcript_get)
            .post(transcript_send)
            .delete(transcript_clear),
    )
}
