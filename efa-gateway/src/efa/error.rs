//! EFA client error types.

/// Errors from fetching or decoding an EFA response.
#[derive(Debug, thiserror::Error)]
pub enum EfaError {
    /// HTTP request failed (connection error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body is not the JSON object we expected
    #[error("invalid JSON from EFA: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// The client cannot answer this request (mock data missing)
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl EfaError {
    /// Build a decode error, keeping a short excerpt of the offending body.
    pub(crate) fn decode(message: impl Into<String>, body: &str) -> Self {
        EfaError::Decode {
            message: message.into(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}
