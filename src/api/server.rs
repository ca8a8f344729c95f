use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Redirect, response::Response, routing::get};
use http::{HeaderValue, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::chat::{ChatService, MemorySessionStore};
use crate::core::AppConfig;
use crate::foundry::FoundryClient;

// Transcripts are per session so pages must never be cached
async fn set_no_store(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(|| async { Redirect::to("/chat") }))
        // Chat pages
        .nest("/chat", routes::chat::router())
        // API routes
        .nest("/api", routes::router())
        .layer(middleware::from_fn(set_no_store))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

/// Build the chat service backed by the configured Foundry
/// deployment and in-process session storage.
pub fn chat_service(config: &AppConfig) -> ChatService {
    let client = Arc::new(FoundryClient::new(config));
    let sessions = Arc::new(MemorySessionStore::new(config.session_idle_timeout));
    ChatService::new(client, sessions)
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Relaying chat to {} deployment {}",
        config.endpoint,
        config.deployment
    );

    let app_state = AppState::new(chat_service(&config), config);
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
