//! Public types for the transcript API
use serde::{Deserialize, Serialize};

use crate::chat::Transcript;

#[derive(Deserialize)]
pub struct SendRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: Transcript,
}
