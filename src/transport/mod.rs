//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! LotusClient / SwanClient
//!     → client.rs (build request, attach bearer token, send)
//!     → response text, or "" on any failure (logged here)
//! ```
//!
//! # Design Decisions
//! - No retries at this layer
//! - One deadline per request, taken from configuration
//! - Multipart upload is the only call that returns a structured error

pub mod client;
pub mod error;

pub use client::{HttpMethod, Payload, Transport};
pub use error::TransportError;
