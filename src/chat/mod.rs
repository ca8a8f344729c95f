mod core;
mod models;
mod session;

pub use self::core::{ChatService, SESSION_KEY_MESSAGES, SharedSessionStore};
pub use models::Transcript;
pub use session::{MemorySessionStore, SessionStore};
