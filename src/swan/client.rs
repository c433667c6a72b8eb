//! Task service REST client.
//!
//! # Responsibilities
//! - Exchange API credentials for a session token once, at construction
//! - Attach the session token to every later call
//! - Decode the `{status, data}` replies and check the status marker

use std::path::Path;

use tracing::{error, info, warn};
use url::Url;

use crate::config::SwanConfig;
use crate::error::{DealError, DealResult};
use crate::observability::metrics;
use crate::swan::types::{
    is_success, DealListResponse, DealRecord, RestToken, StatusResponse, Task, TokenRequest, TokenResponse,
    UpdateDealResponse, DEFAULT_DEAL_LIMIT, STATUS_INFO_FIELDS,
};
use crate::transport::{HttpMethod, Payload, Transport, TransportError};

const HANDSHAKE_PATH: &str = "user/api_keys/jwt";

/// Authenticated task service session. The token is fixed for the client's
/// lifetime; build a new client to re-authenticate.
#[derive(Clone)]
pub struct SwanClient {
    transport: Transport,
    api_url: String,
    token: RestToken,
}

impl SwanClient {
    /// Perform the session handshake.
    ///
    /// A refused handshake is reported as [`DealError::FatalAuth`]; no other
    /// call can succeed without a session, so callers normally stop there.
    pub async fn connect(config: &SwanConfig, transport: Transport) -> DealResult<Self> {
        let api_url = config.api_url.trim_end_matches('/').to_string();
        let url = format!("{}/{}", api_url, HANDSHAKE_PATH);

        let credentials = TokenRequest {
            apikey: &config.api_key,
            access_token: &config.access_token,
        };
        let body = serde_json::to_value(&credentials)
            .map_err(|e| DealError::InvalidRequest(format!("failed to encode credentials: {}", e)))?;

        let response = transport.exchange(&url, Payload::Json(body), None, HttpMethod::Post).await;
        let result = Self::parse_handshake(&response, &url);
        metrics::record_rest("handshake", outcome(&result));

        let jwt = result?;
        info!(api_url = %api_url, "Task service session established");

        Ok(Self {
            transport,
            api_url,
            token: RestToken {
                api_key: config.api_key.clone(),
                bearer_token: jwt,
            },
        })
    }

    /// Build a client around an already issued session token.
    pub fn with_token(api_url: &str, token: RestToken, transport: Transport) -> Self {
        Self {
            transport,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> &RestToken {
        &self.token
    }

    fn parse_handshake(response: &str, url: &str) -> DealResult<String> {
        if response.is_empty() {
            return Err(DealError::FatalAuth {
                status: "error".to_string(),
                message: format!("no response from {}", url),
            });
        }

        let parsed = serde_json::from_str::<TokenResponse>(response);

        // Any failure marker in the body refuses the session, decodable or not.
        if response.contains("fail") {
            let (status, message) = match parsed {
                Ok(reply) => (reply.status, reply.message),
                Err(_) => ("fail".to_string(), response.to_string()),
            };
            return Err(DealError::FatalAuth { status, message });
        }

        let reply = parsed.map_err(|e| DealError::FatalAuth {
            status: "error".to_string(),
            message: format!("invalid handshake response: {}", e),
        })?;

        match reply.data.and_then(|data| data.jwt) {
            Some(jwt) if !jwt.is_empty() => Ok(jwt),
            _ => Err(DealError::FatalAuth {
                status: reply.status,
                message: "fail to connect swan api".to_string(),
            }),
        }
    }

    /// Deals of `miner_id` in `status`, first page only.
    ///
    /// Any failure yields an empty list; the cause is logged.
    pub async fn fetch_deals(&self, miner_id: &str, status: &str, limit: Option<u32>) -> Vec<DealRecord> {
        let limit = limit.unwrap_or(DEFAULT_DEAL_LIMIT);

        let url = match self.url(&["offline_deals", miner_id]) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("deal_status", status)
                    .append_pair("limit", &limit.to_string())
                    .append_pair("offset", "0");
                url
            }
            Err(e) => {
                error!(miner_id = %miner_id, error = %e, "Failed to build deal list URL");
                metrics::record_rest("fetch_deals", "local");
                return Vec::new();
            }
        };

        let response = self
            .transport
            .exchange(url.as_str(), Payload::Empty, Some(&self.token.bearer_token), HttpMethod::Get)
            .await;

        let reply: DealListResponse = match serde_json::from_str(&response) {
            Ok(reply) => reply,
            Err(e) => {
                error!(miner_id = %miner_id, deal_status = %status, error = %e, "Failed to decode deal list");
                metrics::record_rest("fetch_deals", "decode_failure");
                return Vec::new();
            }
        };

        if !is_success(&reply.status) {
            error!(miner_id = %miner_id, deal_status = %status, status = %reply.status, "Get offline deals failed");
            metrics::record_rest("fetch_deals", "protocol_error");
            return Vec::new();
        }

        metrics::record_rest("fetch_deals", "ok");
        reply.data.deal
    }

    /// Submit a status transition for a deal.
    ///
    /// `status_info` holds, positionally, `note`, `file_path`, `file_size`;
    /// only the supplied prefix is sent.
    pub async fn update_deal_status(&self, deal_id: i64, status: &str, status_info: &[&str]) -> bool {
        if status.is_empty() {
            error!(deal_id, "Please provide status");
            metrics::record_rest("update_deal_status", "local");
            return false;
        }
        if status_info.len() > STATUS_INFO_FIELDS.len() {
            warn!(deal_id, extra = status_info.len() - STATUS_INFO_FIELDS.len(), "Ignoring extra status info");
        }

        let url = match self.url(&["my_miner", "deals", &deal_id.to_string()]) {
            Ok(url) => url,
            Err(e) => {
                error!(deal_id, error = %e, "Failed to build deal update URL");
                metrics::record_rest("update_deal_status", "local");
                return false;
            }
        };

        let mut fields = vec![("status".to_string(), status.to_string())];
        fields.extend(
            STATUS_INFO_FIELDS
                .iter()
                .zip(status_info)
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );

        let response = self
            .transport
            .exchange(url.as_str(), Payload::Form(fields), Some(&self.token.bearer_token), HttpMethod::Put)
            .await;

        let reply: UpdateDealResponse = match serde_json::from_str(&response) {
            Ok(reply) => reply,
            Err(e) => {
                error!(deal_id, status = %status, error = %e, "Failed to decode deal update response");
                metrics::record_rest("update_deal_status", "decode_failure");
                return false;
            }
        };

        if !is_success(&reply.status) {
            error!(
                deal_id,
                status = %status,
                message = %reply.data.message,
                "Update offline deal status failed"
            );
            metrics::record_rest("update_deal_status", "protocol_error");
            return false;
        }

        metrics::record_rest("update_deal_status", "ok");
        true
    }

    /// Assign a task to a storage provider.
    ///
    /// Returns the raw reply once its status has been checked.
    pub async fn reassign_task_miner(&self, task_uuid: &str, miner_id: &str) -> DealResult<String> {
        let operation = format!("reassign task {} to {}", task_uuid, miner_id);
        let result = self.reassign(&operation, task_uuid, miner_id).await;
        if let Err(e) = &result {
            error!(task_uuid = %task_uuid, miner_id = %miner_id, error = %e, "Task reassignment failed");
        }
        metrics::record_rest("reassign_task_miner", outcome(&result));
        result
    }

    async fn reassign(&self, operation: &str, task_uuid: &str, miner_id: &str) -> DealResult<String> {
        let url = self
            .url(&["uuid_tasks", task_uuid])
            .map_err(|e| DealError::InvalidRequest(format!("{}: {}", operation, e)))?;

        let fields = vec![("miner_fid".to_string(), miner_id.to_string())];
        let response = self
            .transport
            .exchange(url.as_str(), Payload::Form(fields), Some(&self.token.bearer_token), HttpMethod::Put)
            .await;
        if response.is_empty() {
            return Err(DealError::transport(operation, url.as_str()));
        }

        let reply: StatusResponse = serde_json::from_str(&response).map_err(|e| DealError::decode(operation, e))?;
        if !is_success(&reply.status) {
            return Err(DealError::protocol(operation, None, reply.message));
        }

        Ok(response)
    }

    /// Upload task metadata and the task file.
    ///
    /// Returns the raw reply, or an empty string if the upload failed.
    pub async fn create_task(&self, task: &Task, csv_path: &Path) -> String {
        let url = match self.url(&["tasks"]) {
            Ok(url) => url,
            Err(e) => {
                error!(task_name = %task.task_name, error = %e, "Failed to build task URL");
                metrics::record_rest("create_task", "local");
                return String::new();
            }
        };

        let fields = task.form_fields();
        match self
            .transport
            .exchange_multipart(url.as_str(), &self.token.bearer_token, &fields, "file", csv_path)
            .await
        {
            Ok(response) => {
                info!(task_name = %task.task_name, path = %csv_path.display(), "Task uploaded");
                metrics::record_rest("create_task", "ok");
                response
            }
            Err(e) => {
                error!(
                    task_name = %task.task_name,
                    path = %csv_path.display(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "Task upload failed"
                );
                let outcome = match e {
                    TransportError::Io { .. } => "local",
                    _ => "transport_failure",
                };
                metrics::record_rest("create_task", outcome);
                String::new()
            }
        }
    }

    /// Join path segments onto the API base, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn outcome<T>(result: &DealResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.kind().as_str(),
    }
}

impl std::fmt::Debug for SwanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwanClient").field("api_url", &self.api_url).finish()
    }
}
