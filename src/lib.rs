//! Storage deal client library.
//!
//! Drives a storage deal through a chain node (JSON-RPC) and reports its
//! progress to a task service (REST).

pub mod config;
pub mod deal;
pub mod error;
pub mod lotus;
pub mod observability;
pub mod swan;
pub mod transport;

pub use config::ClientConfig;
pub use deal::{DealLifecycle, DealOutcome, DealRequest, DealStatus};
pub use error::{DealError, DealResult, ErrorKind};
pub use lotus::LotusClient;
pub use swan::SwanClient;
pub use transport::Transport;
