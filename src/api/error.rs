//! Errors raised at the HTTP boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no API key configured (set OPENAI_API_KEY or openai.api_key)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Builds a status error from a non-2xx body, preferring `error.message`.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "empty response body".to_string()
                } else {
                    trimmed.to_string()
                }
            });
        Self::Status { status, message }
    }
}
