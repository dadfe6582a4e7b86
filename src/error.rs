//! Error types for talking to the catalog service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error (status {status_code}): {message}")]
    Api {
        status_code: u16,
        message: String,
    },

    #[error("Failed to parse catalog response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl SubmissionError {
    /// Whether the service answered at all
    pub fn is_server_error(&self) -> bool {
        matches!(self, SubmissionError::Api { .. } | SubmissionError::MalformedResponse { .. })
    }
}
