mod config;
pub use config::{ApiKey, AppConfig};
