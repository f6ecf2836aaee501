use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PineconeError>;

#[derive(Error, Debug)]
pub enum PineconeError {
    #[error("PINECONE_API_KEY is not set in the environment")]
    MissingApiKey,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pinecone API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Index {name} has no data-plane host yet")]
    MissingHost { name: String },

    #[error("Index {name} not ready after {waited:?}")]
    IndexNotReady { name: String, waited: Duration },
}

impl PineconeError {
    /// True for errors raised before any request leaves the process.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Build an `Api` error from a non-2xx response body.
    ///
    /// The control plane answers `{"error": {"code", "message"}, "status"}` while
    /// the data plane answers `{"code", "message", "details"}`. Anything else is
    /// kept verbatim.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });
        Self::Api { status, message }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let nested = value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str());
    let flat = value.get("message").and_then(|m| m.as_str());
    let bare = value.get("error").and_then(|e| e.as_str());
    nested.or(flat).or(bare).map(str::to_string)
}
