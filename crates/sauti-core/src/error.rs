//! Error types for the Sauti turn pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by provider clients and configuration loading.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("Chat completion error: {0}")]
    Chat(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
