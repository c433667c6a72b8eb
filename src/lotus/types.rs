//! Chain node wire types and the JSON-RPC envelope.

use serde::de::DeserializeOwned;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::DealConfig;

/// JSON-RPC protocol version sent with every call.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Correlation id sent with every call. Calls are sequential per caller, so
/// one constant id is enough.
pub const JSON_RPC_ID: u64 = 7878;

/// Raw block size announced in every deal proposal.
pub const RAW_BLOCK_SIZE: u64 = 42;

/// Outgoing JSON-RPC request. `params` is a tuple so the wire form is a
/// positional array whose order is fixed by the type.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: u64,
}

impl<P: Serialize> RpcRequest<P> {
    pub fn new(method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION,
            method,
            params,
            id: JSON_RPC_ID,
        }
    }
}

/// Empty positional parameter list, serialized as `[]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl Serialize for NoParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_tuple(0)?.end()
    }
}

/// Error object reported by the chain node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
}

/// Incoming JSON-RPC envelope. `result` is kept untyped until the error
/// field has been inspected, so an error always wins over a result.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope {
    /// Null when the node could not parse the request.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Decoded outcome of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome<T> {
    Success(T),
    /// `result` missing or `null`.
    Empty,
    Failed(ErrorDetail),
}

impl RpcEnvelope {
    pub fn into_outcome<T: DeserializeOwned>(self) -> Result<RpcOutcome<T>, serde_json::Error> {
        if let Some(error) = self.error {
            return Ok(RpcOutcome::Failed(error));
        }

        match self.result {
            None | Some(serde_json::Value::Null) => Ok(RpcOutcome::Empty),
            Some(value) => serde_json::from_value(value).map(RpcOutcome::Success),
        }
    }
}

/// IPLD link form of a content identifier: `{"/": "bafy..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid {
    #[serde(rename = "/")]
    pub cid: String,
}

impl Cid {
    pub fn new(cid: impl Into<String>) -> Self {
        Self { cid: cid.into() }
    }
}

impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cid)
    }
}

/// Local file reference understood by import and car generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "IsCAR")]
    pub is_car: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(rename = "APIVersion", default)]
    pub api_version: u64,
    #[serde(default)]
    pub block_delay: u64,
}

/// Snapshot of a storage provider's current offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ask {
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "VerifiedPrice")]
    pub verified_price: String,
    #[serde(rename = "MinPieceSize")]
    pub min_piece_size: u64,
    #[serde(rename = "MaxPieceSize")]
    pub max_piece_size: u64,
    #[serde(rename = "Miner")]
    pub miner_id: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "Expiry")]
    pub expiry: i64,
    #[serde(rename = "SeqNo")]
    pub sequence_number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskResult {
    #[serde(rename = "Ask")]
    pub ask: Ask,
}

/// Piece commitment: piece cid and unpadded piece size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommPResult {
    #[serde(rename = "Root")]
    pub root: Cid,
    #[serde(rename = "Size")]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportResult {
    #[serde(rename = "Root")]
    pub root: Cid,
    #[serde(rename = "ImportID", default)]
    pub import_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TipSet {
    #[serde(rename = "Cids", default)]
    pub cids: Vec<Cid>,
    #[serde(rename = "Height")]
    pub height: i64,
}

/// Client-side view of a proposed deal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DealInfo {
    #[serde(rename = "ProposalCid")]
    pub proposal_cid: Cid,
    #[serde(rename = "State")]
    pub state: u64,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Provider")]
    pub provider: String,
    #[serde(rename = "PieceCID")]
    pub piece_cid: Option<Cid>,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "PricePerEpoch")]
    pub price_per_epoch: String,
    #[serde(rename = "Duration")]
    pub duration: u64,
    #[serde(rename = "DealID")]
    pub deal_id: u64,
}

impl Default for DealInfo {
    fn default() -> Self {
        Self {
            proposal_cid: Cid::default(),
            state: 0,
            message: String::new(),
            provider: String::new(),
            piece_cid: None,
            size: 0,
            price_per_epoch: "0".to_string(),
            duration: 0,
            deal_id: 0,
        }
    }
}

/// Data section of a deal proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealData {
    #[serde(rename = "TransferType")]
    pub transfer_type: String,
    #[serde(rename = "Root")]
    pub root_cid: Cid,
    #[serde(rename = "PieceCid")]
    pub piece_cid: Cid,
    #[serde(rename = "PieceSize")]
    pub piece_size: u64,
    #[serde(rename = "RawBlockSize")]
    pub raw_block_size: u64,
}

/// Parameters of `Filecoin.ClientStartDeal`.
///
/// Built once per proposal from computed identifiers and the deal
/// configuration; fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartDealParameters {
    #[serde(rename = "Data")]
    data: DealData,
    #[serde(rename = "Wallet")]
    sender_wallet: String,
    #[serde(rename = "Miner")]
    miner_id: String,
    #[serde(rename = "EpochPrice")]
    price_per_epoch: String,
    #[serde(rename = "MinBlocksDuration")]
    duration_in_blocks: u64,
    #[serde(rename = "ProviderCollateral")]
    provider_collateral: String,
    #[serde(rename = "DealStartEpoch")]
    start_epoch: i64,
    #[serde(rename = "FastRetrieval")]
    fast_retrieval: bool,
    #[serde(rename = "VerifiedDeal")]
    verified: bool,
}

impl StartDealParameters {
    pub fn new(
        data_cid: impl Into<String>,
        piece_cid: impl Into<String>,
        piece_size: u64,
        start_epoch: i64,
        deal: &DealConfig,
    ) -> Self {
        Self {
            data: DealData {
                transfer_type: deal.transfer_type.clone(),
                root_cid: Cid::new(data_cid),
                piece_cid: Cid::new(piece_cid),
                piece_size,
                raw_block_size: RAW_BLOCK_SIZE,
            },
            sender_wallet: deal.sender_wallet.clone(),
            miner_id: deal.miner_id.clone(),
            price_per_epoch: deal.epoch_price().unwrap_or_else(|| deal.price_per_epoch.clone()),
            duration_in_blocks: deal.duration,
            provider_collateral: deal.collateral().unwrap_or_else(|| deal.provider_collateral.clone()),
            start_epoch,
            fast_retrieval: deal.fast_retrieval,
            verified: deal.verified_deal,
        }
    }

    pub fn data(&self) -> &DealData {
        &self.data
    }

    pub fn sender_wallet(&self) -> &str {
        &self.sender_wallet
    }

    pub fn miner_id(&self) -> &str {
        &self.miner_id
    }

    pub fn start_epoch(&self) -> i64 {
        self.start_epoch
    }

    pub fn verified(&self) -> bool {
        self.verified
    }
}
