//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section is defaulted so a minimal file only needs credentials.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Root configuration for the deal client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Chain node JSON-RPC endpoints.
    pub lotus: LotusConfig,

    /// Task service REST endpoint and credentials.
    pub swan: SwanConfig,

    /// HTTP deadlines.
    pub transport: TransportConfig,

    /// Deal parameters applied to every proposal.
    pub deal: DealConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Chain node endpoints.
///
/// `api_url` serves account-scoped calls (import, commP, car generation,
/// deal start) and requires `access_token`. `miner_api_url` serves public
/// queries (version, ask) without a token.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LotusConfig {
    pub api_url: String,
    pub access_token: String,
    pub miner_api_url: String,
}

impl Default for LotusConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:1234/rpc/v0".to_string(),
            access_token: String::new(),
            miner_api_url: "http://127.0.0.1:2345/rpc/v0".to_string(),
        }
    }
}

/// Task service endpoint and credentials used for the session handshake.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwanConfig {
    pub api_url: String,
    pub api_key: String,
    pub access_token: String,
}

impl Default for SwanConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.filswan.com".to_string(),
            api_key: String::new(),
            access_token: String::new(),
        }
    }
}

/// Per-request deadlines. No retry policy lives here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Total time for request/response in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Externally supplied deal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DealConfig {
    /// Wallet paying for the deal.
    pub sender_wallet: String,

    /// Storage provider receiving the proposal.
    pub miner_id: String,

    /// Price per epoch in attoFIL, a non-negative integer.
    pub price_per_epoch: String,

    /// Deal duration in epochs.
    pub duration: u64,

    /// Provider collateral in attoFIL, a non-negative integer.
    pub provider_collateral: String,

    pub fast_retrieval: bool,

    pub verified_deal: bool,

    /// Data transfer type announced in the proposal ("manual" for offline deals).
    pub transfer_type: String,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            sender_wallet: String::new(),
            miner_id: String::new(),
            price_per_epoch: "0".to_string(),
            duration: DEFAULT_DEAL_DURATION,
            provider_collateral: "0".to_string(),
            fast_retrieval: true,
            verified_deal: false,
            transfer_type: "manual".to_string(),
        }
    }
}

impl DealConfig {
    /// `price_per_epoch` in canonical integer form.
    pub fn epoch_price(&self) -> Option<String> {
        atto_amount(&self.price_per_epoch)
    }

    /// `provider_collateral` in canonical integer form.
    pub fn collateral(&self) -> Option<String> {
        atto_amount(&self.provider_collateral)
    }
}

/// Canonical attoFIL integer for a configured amount (`"1e3"` becomes
/// `"1000"`). `None` for negative, fractional or non-numeric values.
pub fn atto_amount(value: &str) -> Option<String> {
    let amount = BigDecimal::from_str(value.trim()).ok()?;
    let whole = amount.with_scale(0);
    if amount < BigDecimal::from(0) || whole != amount {
        return None;
    }
    let (digits, _) = whole.into_bigint_and_exponent();
    Some(digits.to_string())
}

/// Default deal duration: 525 days of 30 second epochs.
pub const DEFAULT_DEAL_DURATION: u64 = 1_512_000;

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
