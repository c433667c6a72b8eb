//! Transport error type.
//!
//! Only construction and multipart upload return it; plain exchanges collapse
//! every failure into an empty body.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Local file could not be read for upload.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Building the client or sending the request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request(e) if e.is_timeout())
    }
}
