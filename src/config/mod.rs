//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → sections handed to Transport, LotusClient, SwanClient, DealLifecycle
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reads it through a global
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::DealConfig;
pub use schema::LotusConfig;
pub use schema::ObservabilityConfig;
pub use schema::SwanConfig;
pub use schema::TransportConfig;
