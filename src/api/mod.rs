pub mod routes;
mod server;
pub use server::{app, chat_service, serve};
pub mod public;
mod state;
pub use state::AppState;
mod utils;
pub mod views;
