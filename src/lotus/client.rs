//! Chain node JSON-RPC client.
//!
//! # Responsibilities
//! - Wrap each typed method in a JSON-RPC request
//! - Route public queries to the miner API without a token, everything else
//!   to the node API with the access token
//! - Turn the response envelope into exactly one success value or one error

use tracing::{error, info};

use crate::config::LotusConfig;
use crate::error::{DealError, DealResult};
use crate::lotus::methods::{
    ChainHead, ClientCalcCommP, ClientGenCar, ClientGetDealInfo, ClientGetDealStatus, ClientImport,
    ClientStartDeal, Endpoint, MarketGetAsk, RpcMethod, Version,
};
use crate::lotus::types::{
    Ask, CommPResult, DealInfo, RpcEnvelope, RpcOutcome, RpcRequest, StartDealParameters, TipSet,
};
use crate::observability::metrics;
use crate::transport::{HttpMethod, Payload, Transport};

/// Chain node client. Holds no mutable state; clone freely.
#[derive(Clone)]
pub struct LotusClient {
    transport: Transport,
    config: LotusConfig,
}

impl LotusClient {
    pub fn new(config: LotusConfig, transport: Transport) -> Self {
        Self { transport, config }
    }

    /// Version string reported by the storage provider's node.
    pub async fn version(&self) -> DealResult<String> {
        self.call(&Version).await.map(|info| info.version)
    }

    /// Current storage ask of the configured storage provider.
    pub async fn market_get_ask(&self) -> DealResult<Ask> {
        self.call(&MarketGetAsk).await.map(|result| result.ask)
    }

    /// Piece cid of the archive at `path` (a path on the node's filesystem).
    pub async fn calc_commp(&self, path: &str) -> DealResult<String> {
        self.calc_commp_detail(path).await.map(|commp| commp.root.cid)
    }

    /// Piece cid and unpadded piece size of the archive at `path`.
    pub async fn calc_commp_detail(&self, path: &str) -> DealResult<CommPResult> {
        self.call(&ClientCalcCommP { path }).await
    }

    /// Import a file into the node and return its data cid.
    pub async fn import(&self, path: &str, is_car: bool) -> DealResult<String> {
        self.call(&ClientImport { path, is_car })
            .await
            .map(|result| result.root.cid)
    }

    /// Generate the archive form of `source` at `dest`.
    pub async fn gen_car(&self, source: &str, dest: &str, source_is_car: bool) -> DealResult<()> {
        self.call_unit(&ClientGenCar {
            source,
            source_is_car,
            dest,
        })
        .await
    }

    /// Propose a deal and return the proposal cid.
    pub async fn start_deal(&self, params: &StartDealParameters) -> DealResult<String> {
        let proposal = self.call(&ClientStartDeal { params }).await?;
        info!(proposal_cid = %proposal, miner = %params.miner_id(), "Deal proposed");
        Ok(proposal.cid)
    }

    pub async fn chain_head(&self) -> DealResult<TipSet> {
        self.call(&ChainHead).await
    }

    pub async fn deal_info(&self, proposal_cid: &str) -> DealResult<DealInfo> {
        self.call(&ClientGetDealInfo { proposal_cid }).await
    }

    /// Human readable name of a deal state code.
    pub async fn deal_status(&self, code: u64) -> DealResult<String> {
        self.call(&ClientGetDealStatus { code }).await
    }

    /// Call a method whose result is required.
    async fn call<M: RpcMethod>(&self, method: &M) -> DealResult<M::Output> {
        let result = match self.dispatch(method).await {
            Ok(RpcOutcome::Success(value)) => Ok(value),
            Ok(RpcOutcome::Empty) => Err(DealError::empty(method.describe())),
            Ok(RpcOutcome::Failed(detail)) => Err(DealError::protocol(
                method.describe(),
                Some(detail.code),
                detail.message,
            )),
            Err(e) => Err(e),
        };
        Self::finish::<M, _>(result)
    }

    /// Call a method that signals success with an empty result.
    async fn call_unit<M: RpcMethod>(&self, method: &M) -> DealResult<()> {
        let result = match self.dispatch(method).await {
            Ok(RpcOutcome::Success(_)) | Ok(RpcOutcome::Empty) => Ok(()),
            Ok(RpcOutcome::Failed(detail)) => Err(DealError::protocol(
                method.describe(),
                Some(detail.code),
                detail.message,
            )),
            Err(e) => Err(e),
        };
        Self::finish::<M, _>(result)
    }

    async fn dispatch<M: RpcMethod>(&self, method: &M) -> DealResult<RpcOutcome<M::Output>> {
        let (url, token) = match M::ENDPOINT {
            Endpoint::Miner => (self.config.miner_api_url.as_str(), None),
            Endpoint::Node => (self.config.api_url.as_str(), Some(self.config.access_token.as_str())),
        };

        let request = RpcRequest::new(M::NAME, method.params());
        let body = serde_json::to_value(&request).map_err(|e| {
            DealError::InvalidRequest(format!("failed to encode {}: {}", method.describe(), e))
        })?;

        let response = self.transport.exchange(url, Payload::Json(body), token, HttpMethod::Post).await;
        if response.is_empty() {
            return Err(DealError::transport(method.describe(), url));
        }

        let envelope: RpcEnvelope =
            serde_json::from_str(&response).map_err(|e| DealError::decode(method.describe(), e))?;
        envelope
            .into_outcome()
            .map_err(|e| DealError::decode(method.describe(), e))
    }

    fn finish<M: RpcMethod, T>(result: DealResult<T>) -> DealResult<T> {
        match &result {
            Ok(_) => metrics::record_rpc(M::NAME, "ok"),
            Err(e) => {
                error!(method = M::NAME, kind = e.kind().as_str(), error = %e, "Chain node call failed");
                metrics::record_rpc(M::NAME, e.kind().as_str());
            }
        }
        result
    }
}

impl std::fmt::Debug for LotusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotusClient")
            .field("api_url", &self.config.api_url)
            .field("miner_api_url", &self.config.miner_api_url)
            .finish()
    }
}
