//! Task service request and response shapes.

use serde::{Deserialize, Deserializer, Serialize};

/// Status marker of a successful response, compared case-insensitively.
pub const RESPONSE_STATUS_SUCCESS: &str = "SUCCESS";

/// Default page size for deal listings.
pub const DEFAULT_DEAL_LIMIT: u32 = 50;

pub const TASK_TYPE_VERIFIED: &str = "verified";
pub const TASK_TYPE_REGULAR: &str = "regular";

/// Optional status fields of a deal update, in the only order they may be
/// supplied.
pub const STATUS_INFO_FIELDS: [&str; 3] = ["note", "file_path", "file_size"];

pub fn is_success(status: &str) -> bool {
    status.eq_ignore_ascii_case(RESPONSE_STATUS_SUCCESS)
}

/// Credentials exchanged for a session token.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub apikey: &'a str,
    pub access_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub status: String,
    pub message: String,
    pub data: Option<TokenData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenData {
    pub jwt: Option<String>,
}

/// Session credentials held for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct RestToken {
    pub api_key: String,
    pub bearer_token: String,
}

impl std::fmt::Debug for RestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestToken")
            .field("api_key", &"<redacted>")
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Snapshot of a deal record owned by the task service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub deal_cid: Option<String>,
    pub miner_id: String,
    pub status: String,
    #[serde(alias = "data_cid")]
    pub payload_cid: Option<String>,
    pub piece_cid: Option<String>,
    #[serde(deserialize_with = "lenient_opt_u64")]
    pub piece_size: Option<u64>,
    #[serde(deserialize_with = "lenient_opt_i64")]
    pub start_epoch: Option<i64>,
    pub file_path: Option<String>,
    #[serde(deserialize_with = "lenient_opt_u64")]
    pub file_size: Option<u64>,
    pub file_source_url: Option<String>,
    pub note: Option<String>,
    pub task_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DealListResponse {
    pub status: String,
    pub data: DealListData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DealListData {
    pub deal: Vec<DealRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDealResponse {
    pub status: String,
    pub data: UpdateDealData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDealData {
    pub deal: Option<DealRecord>,
    pub message: String,
}

/// Generic `{status, message}` reply of task endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Task metadata submitted alongside the generated task file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub task_name: String,
    pub curated_dataset: String,
    pub description: String,
    pub is_public: bool,
    pub is_verified: bool,
    pub miner_id: Option<String>,
}

impl Task {
    /// Multipart text fields; `miner_id` only when assigned.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let task_type = if self.is_verified {
            TASK_TYPE_VERIFIED
        } else {
            TASK_TYPE_REGULAR
        };

        let mut fields = vec![
            ("task_name".to_string(), self.task_name.clone()),
            ("curated_dataset".to_string(), self.curated_dataset.clone()),
            ("description".to_string(), self.description.clone()),
            ("is_public".to_string(), self.is_public.to_string()),
            ("type".to_string(), task_type.to_string()),
        ];
        if let Some(miner_id) = &self.miner_id {
            fields.push(("miner_id".to_string(), miner_id.clone()));
        }
        fields
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Uint(u64),
    Text(String),
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Int(n)) => Some(n),
        Some(NumberOrString::Uint(n)) => i64::try_from(n).ok(),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Int(n)) => u64::try_from(n).ok(),
        Some(NumberOrString::Uint(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    lenient_opt_i64(deserializer).map(|n| n.unwrap_or_default())
}
