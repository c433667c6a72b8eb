//! Deal lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! DealRequest
//!     → LotusClient::import            (data cid)
//!     → LotusClient::gen_car           (optional archive form)
//!     → LotusClient::calc_commp_detail (piece cid + size)
//!     → StartDealParameters            (ids + DealConfig)
//!     → LotusClient::start_deal        (proposal cid)
//!     → SwanClient::update_deal_status (Created, proposal cid, path, size)
//!     → DealOutcome
//! ```

pub mod lifecycle;
pub mod types;

pub use lifecycle::DealLifecycle;
pub use types::{padded_piece_size, DealOutcome, DealRequest, DealStatus};
