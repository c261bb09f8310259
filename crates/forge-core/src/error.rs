//! Error type shared by the core library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("FORGE API returned status {0}")]
    Status(u16),

    /// Non-2xx status carrying a `{"detail": ...}` body
    #[error("FORGE API returned status {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Response body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request was cancelled before it resolved
    #[error("Request cancelled")]
    Cancelled,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ForgeError>;

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Decode(err.to_string())
    }
}
