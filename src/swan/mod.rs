//! Task service (Swan) REST adapter.
//!
//! # Data Flow
//! ```text
//! SwanClient::connect
//!     → POST /user/api_keys/jwt {apikey, access_token}
//!     → session token held for the client's lifetime
//!
//! fetch_deals        → GET  /offline_deals/{miner}?deal_status=&limit=&offset=0
//! update_deal_status → PUT  /my_miner/deals/{id}   (form: status, note, file_path, file_size)
//! reassign_task_miner→ PUT  /uuid_tasks/{uuid}     (form: miner_fid)
//! create_task        → POST /tasks                 (multipart + file)
//! ```
//!
//! # Design Decisions
//! - No automatic re-authentication; an expired token shows up as a failed
//!   status check
//! - `fetch_deals` and `update_deal_status` report failure by an empty list
//!   and `false`; the cause is only in the logs

pub mod client;
pub mod types;

pub use client::SwanClient;
pub use types::{DealRecord, RestToken, Task};
