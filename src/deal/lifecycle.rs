//! Deal proposal sequencing.
//!
//! # Responsibilities
//! - Run import → (archive generation) → commitment → proposal → status report
//! - Halt at the first failing step and return that step's error
//! - Never persist state; the task service is the system of record
//!
//! # Design Decisions
//! - Partial progress is not rolled back: a successful import followed by a
//!   failed commitment leaves the import in place for a manual retry
//! - Independent deals may run concurrently; each sequence only touches its
//!   own deal record

use std::path::Path;

use futures_util::future::join_all;
use tracing::{debug, error, info, info_span, Instrument};

use crate::config::DealConfig;
use crate::deal::types::{padded_piece_size, DealOutcome, DealRequest, DealStatus};
use crate::error::{DealError, DealResult};
use crate::lotus::{LotusClient, StartDealParameters};
use crate::observability::metrics;
use crate::swan::types::{is_success, DealRecord, StatusResponse, Task};
use crate::swan::SwanClient;

/// Drives deals through the chain node and reports to the task service.
#[derive(Debug, Clone)]
pub struct DealLifecycle {
    lotus: LotusClient,
    swan: SwanClient,
    deal_config: DealConfig,
}

impl DealLifecycle {
    pub fn new(lotus: LotusClient, swan: SwanClient, deal_config: DealConfig) -> Self {
        Self {
            lotus,
            swan,
            deal_config,
        }
    }

    pub fn lotus(&self) -> &LotusClient {
        &self.lotus
    }

    pub fn swan(&self) -> &SwanClient {
        &self.swan
    }

    /// Propose one deal and report the proposal to the task service.
    pub async fn propose(&self, request: &DealRequest) -> DealResult<DealOutcome> {
        let span = info_span!("deal", deal_id = request.deal_id, source = %request.source_path);
        let result = self.run_proposal(request).instrument(span).await;

        match &result {
            Ok(outcome) => {
                info!(
                    deal_id = outcome.deal_id,
                    proposal_cid = %outcome.proposal_cid,
                    piece_cid = %outcome.piece_cid,
                    "Deal sequence complete"
                );
                metrics::record_deal("ok");
            }
            Err(e) => {
                error!(deal_id = request.deal_id, path = %request.source_path, error = %e, "Deal sequence halted");
                metrics::record_deal(e.kind().as_str());
            }
        }
        result
    }

    /// Propose several deals concurrently. A failure only halts its own deal.
    pub async fn propose_many(&self, requests: Vec<DealRequest>) -> Vec<(i64, DealResult<DealOutcome>)> {
        join_all(requests.iter().map(|request| async move {
            (request.deal_id, self.propose(request).await)
        }))
        .await
    }

    async fn run_proposal(&self, request: &DealRequest) -> DealResult<DealOutcome> {
        if self.deal_config.epoch_price().is_none() || self.deal_config.collateral().is_none() {
            return Err(DealError::InvalidRequest(format!(
                "deal {}: price '{}' and collateral '{}' must be integer attoFIL amounts",
                request.deal_id, self.deal_config.price_per_epoch, self.deal_config.provider_collateral
            )));
        }

        let data_cid = self
            .lotus
            .import(&request.source_path, request.source_is_car)
            .await?;
        info!(data_cid = %data_cid, "File imported");

        if let Some(car_path) = &request.car_path {
            self.lotus
                .gen_car(&request.source_path, car_path, request.source_is_car)
                .await?;
            info!(car_path = %car_path, "Archive generated");
        }

        let archive_path = request.archive_path();
        let commp = self.lotus.calc_commp_detail(archive_path).await?;
        let piece_size = request
            .piece_size
            .unwrap_or_else(|| padded_piece_size(commp.size));
        info!(piece_cid = %commp.root, piece_size, "Piece commitment computed");

        let params = StartDealParameters::new(
            data_cid.clone(),
            commp.root.cid.clone(),
            piece_size,
            request.start_epoch,
            &self.deal_config,
        );
        let proposal_cid = self.lotus.start_deal(&params).await?;

        // Only known when the node's filesystem is visible from here.
        let file_size = match tokio::fs::metadata(archive_path).await {
            Ok(meta) => Some(meta.len().to_string()),
            Err(e) => {
                debug!(path = %archive_path, error = %e, "Archive not readable locally, reporting without file_size");
                None
            }
        };
        let mut status_info = vec![proposal_cid.as_str(), archive_path];
        if let Some(size) = &file_size {
            status_info.push(size.as_str());
        }
        self.report_status(request.deal_id, DealStatus::Created, &status_info)
            .await?;

        Ok(DealOutcome {
            deal_id: request.deal_id,
            data_cid,
            piece_cid: commp.root.cid,
            piece_size,
            proposal_cid,
            archive_path: archive_path.to_string(),
        })
    }

    /// Deals awaiting action for a storage provider. Empty on failure.
    pub async fn pending_deals(&self, miner_id: &str, status: DealStatus, limit: Option<u32>) -> Vec<DealRecord> {
        self.swan.fetch_deals(miner_id, status.as_str(), limit).await
    }

    /// Report a status transition; a rejected update is a protocol error.
    pub async fn report_status(&self, deal_id: i64, status: DealStatus, status_info: &[&str]) -> DealResult<()> {
        if self
            .swan
            .update_deal_status(deal_id, status.as_str(), status_info)
            .await
        {
            Ok(())
        } else {
            Err(DealError::protocol(
                format!("update deal {} to {}", deal_id, status),
                None,
                "task service rejected the status update",
            ))
        }
    }

    /// Create a task from metadata and a generated task file.
    pub async fn create_task(&self, task: &Task, csv_path: &Path) -> DealResult<String> {
        let operation = format!("create task {}", task.task_name);
        if let Err(e) = tokio::fs::metadata(csv_path).await {
            return Err(DealError::Io {
                operation,
                message: format!("{}: {}", csv_path.display(), e),
            });
        }

        let response = self.swan.create_task(task, csv_path).await;
        if response.is_empty() {
            return Err(DealError::transport(operation, format!("{}/tasks", self.swan.api_url())));
        }

        let reply: StatusResponse = serde_json::from_str(&response).map_err(|e| DealError::decode(&operation, e))?;
        if !is_success(&reply.status) {
            return Err(DealError::protocol(operation, None, reply.message));
        }
        Ok(response)
    }

    pub async fn assign_task_miner(&self, task_uuid: &str, miner_id: &str) -> DealResult<String> {
        self.swan.reassign_task_miner(task_uuid, miner_id).await
    }
}
