//! Typed chain-node methods.
//!
//! Each method fixes its name, the endpoint it is sent to, the exact
//! positional parameter tuple, and the result type. The parameter order is
//! therefore checked by the compiler rather than assembled at runtime.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::lotus::types::{
    AskResult, Cid, CommPResult, DealInfo, FileRef, ImportResult, NoParams, StartDealParameters, TipSet,
    VersionInfo,
};

pub const VERSION: &str = "Filecoin.Version";
pub const MARKET_GET_ASK: &str = "Filecoin.MarketGetAsk";
pub const CLIENT_CALC_COMM_P: &str = "Filecoin.ClientCalcCommP";
pub const CLIENT_IMPORT: &str = "Filecoin.ClientImport";
pub const CLIENT_GEN_CAR: &str = "Filecoin.ClientGenCar";
pub const CLIENT_START_DEAL: &str = "Filecoin.ClientStartDeal";
pub const CHAIN_HEAD: &str = "Filecoin.ChainHead";
pub const CLIENT_GET_DEAL_INFO: &str = "Filecoin.ClientGetDealInfo";
pub const CLIENT_GET_DEAL_STATUS: &str = "Filecoin.ClientGetDealStatus";

/// Which chain-node endpoint a method is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Storage provider API, public queries, no token.
    Miner,
    /// Client node API, account-scoped calls with the access token.
    Node,
}

pub trait RpcMethod {
    const NAME: &'static str;
    const ENDPOINT: Endpoint;

    /// Positional parameters, as a tuple (or [`NoParams`]).
    type Params: Serialize;
    type Output: DeserializeOwned;

    fn params(&self) -> Self::Params;

    /// Label for logs and errors, including the target of the call.
    fn describe(&self) -> String {
        Self::NAME.to_string()
    }
}

pub struct Version;

impl RpcMethod for Version {
    const NAME: &'static str = VERSION;
    const ENDPOINT: Endpoint = Endpoint::Miner;
    type Params = NoParams;
    type Output = VersionInfo;

    fn params(&self) -> NoParams {
        NoParams
    }
}

pub struct MarketGetAsk;

impl RpcMethod for MarketGetAsk {
    const NAME: &'static str = MARKET_GET_ASK;
    const ENDPOINT: Endpoint = Endpoint::Miner;
    type Params = NoParams;
    type Output = AskResult;

    fn params(&self) -> NoParams {
        NoParams
    }
}

/// `[filePath]`
pub struct ClientCalcCommP<'a> {
    pub path: &'a str,
}

impl RpcMethod for ClientCalcCommP<'_> {
    const NAME: &'static str = CLIENT_CALC_COMM_P;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (String,);
    type Output = CommPResult;

    fn params(&self) -> (String,) {
        (self.path.to_string(),)
    }

    fn describe(&self) -> String {
        format!("{}({})", Self::NAME, self.path)
    }
}

/// `[{Path, IsCAR}]`
pub struct ClientImport<'a> {
    pub path: &'a str,
    pub is_car: bool,
}

impl RpcMethod for ClientImport<'_> {
    const NAME: &'static str = CLIENT_IMPORT;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (FileRef,);
    type Output = ImportResult;

    fn params(&self) -> (FileRef,) {
        (FileRef {
            path: self.path.to_string(),
            is_car: self.is_car,
        },)
    }

    fn describe(&self) -> String {
        format!("{}({})", Self::NAME, self.path)
    }
}

/// `[{Path, IsCAR}, destPath]`. Success carries no payload.
pub struct ClientGenCar<'a> {
    pub source: &'a str,
    pub source_is_car: bool,
    pub dest: &'a str,
}

impl RpcMethod for ClientGenCar<'_> {
    const NAME: &'static str = CLIENT_GEN_CAR;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (FileRef, String);
    type Output = IgnoredAny;

    fn params(&self) -> (FileRef, String) {
        (
            FileRef {
                path: self.source.to_string(),
                is_car: self.source_is_car,
            },
            self.dest.to_string(),
        )
    }

    fn describe(&self) -> String {
        format!("{}({} -> {})", Self::NAME, self.source, self.dest)
    }
}

/// `[StartDealParameters]`
pub struct ClientStartDeal<'a> {
    pub params: &'a StartDealParameters,
}

impl RpcMethod for ClientStartDeal<'_> {
    const NAME: &'static str = CLIENT_START_DEAL;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (StartDealParameters,);
    type Output = Cid;

    fn params(&self) -> (StartDealParameters,) {
        (self.params.clone(),)
    }

    fn describe(&self) -> String {
        format!(
            "{}({} -> {})",
            Self::NAME,
            self.params.data().root_cid,
            self.params.miner_id()
        )
    }
}

pub struct ChainHead;

impl RpcMethod for ChainHead {
    const NAME: &'static str = CHAIN_HEAD;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = NoParams;
    type Output = TipSet;

    fn params(&self) -> NoParams {
        NoParams
    }
}

/// `[{"/": proposalCid}]`
pub struct ClientGetDealInfo<'a> {
    pub proposal_cid: &'a str,
}

impl RpcMethod for ClientGetDealInfo<'_> {
    const NAME: &'static str = CLIENT_GET_DEAL_INFO;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (Cid,);
    type Output = DealInfo;

    fn params(&self) -> (Cid,) {
        (Cid::new(self.proposal_cid),)
    }

    fn describe(&self) -> String {
        format!("{}({})", Self::NAME, self.proposal_cid)
    }
}

/// `[statusCode]`
pub struct ClientGetDealStatus {
    pub code: u64,
}

impl RpcMethod for ClientGetDealStatus {
    const NAME: &'static str = CLIENT_GET_DEAL_STATUS;
    const ENDPOINT: Endpoint = Endpoint::Node;
    type Params = (u64,);
    type Output = String;

    fn params(&self) -> (u64,) {
        (self.code,)
    }

    fn describe(&self) -> String {
        format!("{}({})", Self::NAME, self.code)
    }
}
