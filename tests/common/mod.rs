//! Shared fixtures for integration tests: configs and clients pointed at a
//! mock HTTP server, and JSON-RPC reply builders.

#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::{json, Value};
use swan_client::config::{DealConfig, LotusConfig, SwanConfig, TransportConfig};
use swan_client::swan::RestToken;
use swan_client::{LotusClient, SwanClient, Transport};

pub const NODE_TOKEN: &str = "node-token";
pub const SESSION_JWT: &str = "session-jwt";
pub const NODE_PATH: &str = "/rpc/v0";
pub const MINER_PATH: &str = "/miner/rpc/v0";

pub fn transport() -> Transport {
    Transport::new(&TransportConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    })
    .unwrap()
}

pub fn lotus_config(server: &MockServer) -> LotusConfig {
    LotusConfig {
        api_url: server.url(NODE_PATH),
        access_token: NODE_TOKEN.to_string(),
        miner_api_url: server.url(MINER_PATH),
    }
}

pub fn lotus_client(server: &MockServer) -> LotusClient {
    LotusClient::new(lotus_config(server), transport())
}

pub fn swan_config(server: &MockServer) -> SwanConfig {
    SwanConfig {
        api_url: server.base_url(),
        api_key: "api-key".to_string(),
        access_token: "access-token".to_string(),
    }
}

/// A client with an already issued session token, skipping the handshake.
pub fn swan_client(server: &MockServer) -> SwanClient {
    SwanClient::with_token(
        &server.base_url(),
        RestToken {
            api_key: "api-key".to_string(),
            bearer_token: SESSION_JWT.to_string(),
        },
        transport(),
    )
}

pub fn deal_config() -> DealConfig {
    DealConfig {
        sender_wallet: "f3abc".to_string(),
        miner_id: "f01000".to_string(),
        price_per_epoch: "0".to_string(),
        duration: 1_512_000,
        provider_collateral: "0".to_string(),
        fast_retrieval: true,
        verified_deal: false,
        transfer_type: "manual".to_string(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn rpc_result(result: Value) -> Value {
    json!({"id": 7878, "jsonrpc": "2.0", "result": result})
}

pub fn rpc_error(code: i64, message: &str) -> Value {
    json!({"id": 7878, "jsonrpc": "2.0", "error": {"code": code, "message": message}})
}

/// Partial-body matcher selecting one JSON-RPC method.
pub fn rpc_method(name: &str) -> String {
    json!({"method": name}).to_string()
}
