//! End-to-end proposal sequences against mock chain node and task service.

use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use swan_client::{DealLifecycle, DealRequest, DealStatus, ErrorKind};

mod common;

use common::{bearer, deal_config, lotus_client, rpc_error, rpc_method, rpc_result, swan_client, SESSION_JWT};

fn lifecycle(server: &MockServer) -> DealLifecycle {
    DealLifecycle::new(lotus_client(server), swan_client(server), deal_config())
}

fn form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

async fn mock_commp(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientCalcCommP"));
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "baga-piece"}, "Size": 2032})));
        })
        .await;
}

#[tokio::test]
async fn test_proposal_reports_created_with_archive_details() {
    let mut archive = tempfile::NamedTempFile::new().unwrap();
    archive.write_all(b"hello world").unwrap();
    let archive_path = archive.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    let import = server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"))
                .body_contains("\"IsCAR\":true");
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-data"}, "ImportID": 1})));
        })
        .await;
    mock_commp(&server).await;
    let start = server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientStartDeal"))
                .body_contains("\"PieceSize\":2048")
                .body_contains("\"DealStartEpoch\":3000");
            then.status(200).json_body(rpc_result(json!({"/": "bafy-proposal"})));
        })
        .await;
    let expected = form(&[
        ("status", "Created"),
        ("note", "bafy-proposal"),
        ("file_path", &archive_path),
        ("file_size", "11"),
    ]);
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/my_miner/deals/42")
                .header("authorization", bearer(SESSION_JWT))
                .body(expected);
            then.status(200)
                .json_body(json!({"status": "success", "data": {"message": "ok"}}));
        })
        .await;

    let request = DealRequest::new(42, archive_path.clone(), 3000);
    let outcome = lifecycle(&server).propose(&request).await.unwrap();

    assert_eq!(outcome.deal_id, 42);
    assert_eq!(outcome.data_cid, "bafy-data");
    assert_eq!(outcome.piece_cid, "baga-piece");
    assert_eq!(outcome.piece_size, 2048);
    assert_eq!(outcome.proposal_cid, "bafy-proposal");
    assert_eq!(outcome.archive_path, archive_path);

    import.assert_async().await;
    start.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_generated_archive_and_piece_size_override() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"))
                .body_contains("\"IsCAR\":false");
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-data"}, "ImportID": 1})));
        })
        .await;
    let gen_car = server
        .mock_async(|when, then| {
            when.method(POST).json_body(json!({
                "jsonrpc": "2.0",
                "method": "Filecoin.ClientGenCar",
                "params": [{"Path": "/node/a.bin", "IsCAR": false}, "/node/a.car"],
                "id": 7878
            }));
            then.status(200).json_body(rpc_result(serde_json::Value::Null));
        })
        .await;
    let commp = server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientCalcCommP"))
                .body_contains("/node/a.car");
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "baga-piece"}, "Size": 2032})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientStartDeal"))
                .body_contains("\"PieceSize\":4096");
            then.status(200).json_body(rpc_result(json!({"/": "bafy-proposal"})));
        })
        .await;
    // Archive is on the node, not local: no file_size is reported.
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/my_miner/deals/7")
                .body("status=Created&note=bafy-proposal&file_path=%2Fnode%2Fa.car");
            then.status(200).json_body(json!({"status": "SUCCESS", "data": {}}));
        })
        .await;

    let request = DealRequest::new(7, "/node/a.bin", 3000)
        .with_car("/node/a.car")
        .with_piece_size(4096);
    let outcome = lifecycle(&server).propose(&request).await.unwrap();

    assert_eq!(outcome.piece_size, 4096);
    assert_eq!(outcome.archive_path, "/node/a.car");
    gen_car.assert_async().await;
    commp.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_failed_step_halts_sequence() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"));
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-data"}, "ImportID": 1})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientCalcCommP"));
            then.status(200).json_body(rpc_error(1, "file not found"));
        })
        .await;
    let start = server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientStartDeal"));
            then.status(200).json_body(rpc_result(json!({"/": "bafy-proposal"})));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT);
            then.status(200).json_body(json!({"status": "success"}));
        })
        .await;

    let err = lifecycle(&server)
        .propose(&DealRequest::new(42, "/node/a.car", 3000))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtocolError);
    assert!(err.to_string().contains("Filecoin.ClientCalcCommP(/node/a.car)"));
    assert_eq!(start.hits_async().await, 0);
    assert_eq!(update.hits_async().await, 0);
}

#[tokio::test]
async fn test_rejected_status_update_fails_the_deal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"));
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-data"}, "ImportID": 1})));
        })
        .await;
    mock_commp(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientStartDeal"));
            then.status(200).json_body(rpc_result(json!({"/": "bafy-proposal"})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/my_miner/deals/42");
            then.status(200)
                .json_body(json!({"status": "fail", "data": {"message": "deal locked"}}));
        })
        .await;

    let err = lifecycle(&server)
        .propose(&DealRequest::new(42, "/node/a.car", 3000))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtocolError);
    assert!(err.to_string().contains("update deal 42 to Created"));
}

#[tokio::test]
async fn test_propose_many_isolates_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"))
                .body_contains("/node/bad.car");
            then.status(200).json_body(rpc_error(1, "no such file"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientImport"))
                .body_contains("/node/good.car");
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-good"}, "ImportID": 2})));
        })
        .await;
    mock_commp(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .json_body_partial(rpc_method("Filecoin.ClientStartDeal"));
            then.status(200).json_body(rpc_result(json!({"/": "bafy-proposal"})));
        })
        .await;
    let good_update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/my_miner/deals/2");
            then.status(200).json_body(json!({"status": "success"}));
        })
        .await;
    let bad_update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/my_miner/deals/1");
            then.status(200).json_body(json!({"status": "success"}));
        })
        .await;

    let results = lifecycle(&server)
        .propose_many(vec![
            DealRequest::new(1, "/node/bad.car", 3000),
            DealRequest::new(2, "/node/good.car", 3000),
        ])
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, 1);
    assert!(results[0].1.is_err());
    assert_eq!(results[1].0, 2);
    assert_eq!(results[1].1.as_ref().unwrap().data_cid, "bafy-good");

    assert_eq!(good_update.hits_async().await, 1);
    assert_eq!(bad_update.hits_async().await, 0);
}

#[tokio::test]
async fn test_pending_deals_uses_status_name() {
    let server = MockServer::start_async().await;
    let deals = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/offline_deals/f01000")
                .query_param("deal_status", "ReadyForImport");
            then.status(200).json_body(json!({
                "status": "success",
                "data": {"deal": [{"id": 5, "miner_id": "f01000", "status": "ReadyForImport"}]}
            }));
        })
        .await;

    let records = lifecycle(&server)
        .pending_deals("f01000", DealStatus::ReadyForImport, None)
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, "ReadyForImport");
    deals.assert_async().await;
}

fn task() -> swan_client::swan::Task {
    swan_client::swan::Task {
        task_name: "dataset-7".to_string(),
        curated_dataset: "open data".to_string(),
        description: String::new(),
        is_public: true,
        is_verified: false,
        miner_id: Some("f01000".to_string()),
    }
}

#[tokio::test]
async fn test_create_task_classifies_replies() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "uuid,source_file_name").unwrap();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/tasks").body_contains("regular");
            then.status(200)
                .json_body(json!({"status": "success", "message": "created"}));
        })
        .await;
    let reply = lifecycle(&server).create_task(&task(), csv.path()).await.unwrap();
    assert!(reply.contains("created"));

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/tasks");
            then.status(200)
                .json_body(json!({"status": "fail", "message": "duplicate task name"}));
        })
        .await;
    let err = lifecycle(&server).create_task(&task(), csv.path()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolError);
    assert!(err.to_string().contains("duplicate task name"));

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/tasks");
            then.status(500).body("internal error");
        })
        .await;
    let err = lifecycle(&server).create_task(&task(), csv.path()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}

#[tokio::test]
async fn test_create_task_missing_file_is_local() {
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/tasks");
            then.status(200).json_body(json!({"status": "success"}));
        })
        .await;

    let err = lifecycle(&server)
        .create_task(&task(), std::path::Path::new("/nonexistent/task.csv"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Local);
    assert_eq!(upload.hits_async().await, 0);
}

#[tokio::test]
async fn test_assign_task_miner_passes_through() {
    let server = MockServer::start_async().await;
    let reassign = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/uuid_tasks/task-9")
                .body("miner_fid=f02000");
            then.status(200).json_body(json!({"status": "success"}));
        })
        .await;

    lifecycle(&server)
        .assign_task_miner("task-9", "f02000")
        .await
        .unwrap();
    reassign.assert_async().await;
}

#[tokio::test]
async fn test_fractional_price_is_rejected_before_import() {
    let server = MockServer::start_async().await;
    let import = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(rpc_result(json!({"Root": {"/": "bafy-data"}, "ImportID": 1})));
        })
        .await;

    let mut config = deal_config();
    config.price_per_epoch = "0.5".to_string();
    let lifecycle = DealLifecycle::new(lotus_client(&server), swan_client(&server), config);

    let err = lifecycle
        .propose(&DealRequest::new(42, "/node/a.car", 3000))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Local);
    assert!(err.to_string().contains("'0.5'"));
    assert_eq!(import.hits_async().await, 0);
}
