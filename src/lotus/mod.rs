//! Chain node (Lotus) JSON-RPC adapter.
//!
//! # Data Flow
//! ```text
//! LotusClient::import / calc_commp / gen_car / start_deal / ...
//!     → methods.rs (typed positional params, endpoint choice)
//!     → types.rs RpcRequest {jsonrpc, method, params, id}
//!     → Transport::exchange (POST)
//!     → RpcEnvelope → RpcOutcome (error wins, null result is empty)
//! ```
//!
//! # Security Constraints
//! - The access token is only sent to the node API, never to the miner API
//! - Tokens are never logged

pub mod client;
pub mod methods;
pub mod types;

pub use client::LotusClient;
pub use types::{Ask, Cid, CommPResult, DealInfo, ErrorDetail, StartDealParameters, TipSet};
