//! News-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("News API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid news payload: {0}")]
    Parse(String),

    #[error("News provider error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("No usable articles")]
    EmptyResult,
}

impl NewsError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(_) => "Network error. Check your connection.".to_string(),
            Self::Status { status: 401, .. } => "News service rejected the API key".to_string(),
            Self::Status { status: 429, .. } => {
                "Too many news requests. Please try again later.".to_string()
            }
            Self::Status { .. } | Self::Parse(_) => "News service unavailable".to_string(),
            Self::Provider { message, .. } => format!("News error: {}", message),
            Self::EmptyResult => "No articles found".to_string(),
        }
    }
}
