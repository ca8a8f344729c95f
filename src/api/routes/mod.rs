//! API routes module

pub mod chat;
pub mod transcript;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined JSON API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Transcript routes
        .nest("/chat", transcript::router())
}
