//! Error taxonomy shared by the adapters and the deal coordinator.
//!
//! Every failure an adapter can observe is folded into one of five kinds:
//! nothing came back, something came back that could not be decoded, the
//! remote reported an error, the remote succeeded with nothing in it, or the
//! task-service handshake was refused.

use thiserror::Error;

/// Coarse classification of a [`DealError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response: network error, timeout, or non-2xx status.
    TransportFailure,
    /// Response body did not match the expected envelope.
    DecodeFailure,
    /// Remote reported an explicit error code or a non-success status.
    ProtocolError,
    /// Syntactically valid response with no payload.
    EmptyResult,
    /// Task-service session handshake failed.
    FatalAuth,
    /// Rejected before anything was sent (bad input, unreadable local file).
    Local,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TransportFailure => "transport_failure",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::ProtocolError => "protocol_error",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::FatalAuth => "fatal_auth",
            ErrorKind::Local => "local",
        }
    }
}

/// Errors surfaced by the chain-node and task-service adapters.
#[derive(Debug, Error)]
pub enum DealError {
    /// No usable response was received.
    #[error("{operation} failed, no response from {url}")]
    Transport { operation: String, url: String },

    /// The response could not be decoded into the expected shape.
    #[error("{operation} failed, invalid response: {message}")]
    Decode { operation: String, message: String },

    /// The remote explicitly reported a failure.
    #[error("{operation} failed, error code:{}, message:{message}", display_code(.code))]
    Protocol {
        operation: String,
        code: Option<i64>,
        message: String,
    },

    /// The remote returned success without the required payload.
    #[error("{operation} failed, result is null")]
    EmptyResult { operation: String },

    /// The task-service handshake was refused; no session can be built.
    #[error("session handshake failed: {status}: {message}")]
    FatalAuth { status: String, message: String },

    /// A local file needed for the request could not be read.
    #[error("{operation} failed, io error: {message}")]
    Io { operation: String, message: String },

    /// The request was rejected before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DealError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DealError::Transport { .. } => ErrorKind::TransportFailure,
            DealError::Decode { .. } => ErrorKind::DecodeFailure,
            DealError::Protocol { .. } => ErrorKind::ProtocolError,
            DealError::EmptyResult { .. } => ErrorKind::EmptyResult,
            DealError::FatalAuth { .. } => ErrorKind::FatalAuth,
            DealError::Io { .. } | DealError::InvalidRequest(_) => ErrorKind::Local,
        }
    }

    /// Only a refused handshake justifies stopping the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DealError::FatalAuth { .. })
    }

    pub fn transport(operation: impl Into<String>, url: impl Into<String>) -> Self {
        DealError::Transport {
            operation: operation.into(),
            url: url.into(),
        }
    }

    pub fn decode(operation: impl Into<String>, source: impl std::fmt::Display) -> Self {
        DealError::Decode {
            operation: operation.into(),
            message: source.to_string(),
        }
    }

    pub fn protocol(operation: impl Into<String>, code: Option<i64>, message: impl Into<String>) -> Self {
        DealError::Protocol {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    pub fn empty(operation: impl Into<String>) -> Self {
        DealError::EmptyResult {
            operation: operation.into(),
        }
    }
}

fn display_code(code: &Option<i64>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// Result type for adapter and coordinator operations.
pub type DealResult<T> = Result<T, DealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = DealError::protocol("Filecoin.ClientImport(/tmp/a.car)", Some(1), "file not found");
        assert_eq!(
            err.to_string(),
            "Filecoin.ClientImport(/tmp/a.car) failed, error code:1, message:file not found"
        );

        let err = DealError::protocol("update_deal_status", None, "deal locked");
        assert!(err.to_string().contains("error code:none"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DealError::transport("op", "http://x").kind(), ErrorKind::TransportFailure);
        assert_eq!(DealError::decode("op", "eof").kind(), ErrorKind::DecodeFailure);
        assert_eq!(DealError::empty("op").kind(), ErrorKind::EmptyResult);
        assert_eq!(DealError::InvalidRequest("x".into()).kind(), ErrorKind::Local);
        assert_eq!(ErrorKind::ProtocolError.as_str(), "protocol_error");
    }

    #[test]
    fn test_only_auth_is_fatal() {
        let auth = DealError::FatalAuth {
            status: "fail".into(),
            message: "bad key".into(),
        };
        assert!(auth.is_fatal());
        assert!(!DealError::empty("op").is_fatal());
        assert_eq!(auth.to_string(), "session handshake failed: fail: bad key");
    }
}
