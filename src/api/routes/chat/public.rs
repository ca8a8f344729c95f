//! Public types for the chat pages
use serde::Deserialize;

/// Form posted by the chat page
#[derive(Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub user_message: String,
}
