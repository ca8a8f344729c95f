//! Router for the chat pages

use std::sync::{Arc, RwLock};

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use handlebars::Handlebars;

use super::public;
use crate::api::state::AppState;
use crate::api::utils::session_id;
use crate::api::views::render_chat_index;
use crate::chat::{ChatService, Transcript};

type SharedState = Arc<RwLock<AppState>>;

fn page_context(state: &SharedState) -> (ChatService, Arc<Handlebars<'static>>, String) {
    let shared_state = state.read().expect("Unable to read share state");
    (
        shared_state.chat.clone(),
        Arc::clone(&shared_state.templates),
        shared_state.config.deployment.clone(),
    )
}

fn render_page(
    jar: CookieJar,
    templates: &Handlebars,
    deployment: &str,
    transcript: &Transcript,
) -> Result<(CookieJar, Html<String>), crate::api::public::ApiError> {
    let html = render_chat_index(templates, deployment, transcript)?;
    Ok((jar, Html(html)))
}

/// Show the session's transcript
async fn chat_index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    let (chat, templates, deployment) = page_context(&state);

    let transcript = chat.show(&session_id).await?;
    render_page(jar, &templates, &deployment, &transcript)
}

/// Send a message and show the updated transcript. Errors from the
/// model endpoint show up in the transcript rather than as an error
/// response.
async fn chat_send(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<public::SendForm>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    let (chat, templates, deployment) = page_context(&state);

    let transcript = chat.send(&session_id, &form.user_message).await?;
    render_page(jar, &templates, &deployment, &transcript)
}

/// Clear the session's transcript and go back to the chat page
async fn chat_clear(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let (jar, session_id) = session_id(jar);
    let (chat, _, _) = page_context(&state);

    chat.clear(&session_id).await?;
    Ok((jar, Redirect::to("/chat")))
}

/// Create the chat page router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(chat_index))
        .route("/send", post(chat_send))
        .route("/clear", post(chat_clear))
}
