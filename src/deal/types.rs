//! Deal coordinator inputs and outputs.

use std::fmt;

/// Smallest piece a storage provider accepts.
pub const MIN_PIECE_SIZE: u64 = 256;

/// Deal states understood by the task service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealStatus {
    Created,
    Waiting,
    ReadyForImport,
    FileImporting,
    FileImported,
    ImportFailed,
    Active,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Created => "Created",
            DealStatus::Waiting => "Waiting",
            DealStatus::ReadyForImport => "ReadyForImport",
            DealStatus::FileImporting => "FileImporting",
            DealStatus::FileImported => "FileImported",
            DealStatus::ImportFailed => "ImportFailed",
            DealStatus::Active => "Active",
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deal to propose. Paths are on the chain node's filesystem; the
/// archive size is only reported when the same path is readable locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRequest {
    /// Task service id of the deal record to report back to.
    pub deal_id: i64,
    /// File to import.
    pub source_path: String,
    /// Whether `source_path` is already in archive form.
    pub source_is_car: bool,
    /// Where to generate the archive form; `None` uses `source_path` as is.
    pub car_path: Option<String>,
    pub start_epoch: i64,
    /// Padded piece size override; derived from the commitment when absent.
    pub piece_size: Option<u64>,
}

impl DealRequest {
    pub fn new(deal_id: i64, source_path: impl Into<String>, start_epoch: i64) -> Self {
        Self {
            deal_id,
            source_path: source_path.into(),
            source_is_car: true,
            car_path: None,
            start_epoch,
            piece_size: None,
        }
    }

    /// Generate the archive at `car_path` before computing the commitment.
    pub fn with_car(mut self, car_path: impl Into<String>) -> Self {
        self.source_is_car = false;
        self.car_path = Some(car_path.into());
        self
    }

    pub fn with_piece_size(mut self, piece_size: u64) -> Self {
        self.piece_size = Some(piece_size);
        self
    }

    /// File the commitment is computed over.
    pub fn archive_path(&self) -> &str {
        self.car_path.as_deref().unwrap_or(&self.source_path)
    }
}

/// Identifiers produced by a completed proposal sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealOutcome {
    pub deal_id: i64,
    pub data_cid: String,
    pub piece_cid: String,
    pub piece_size: u64,
    pub proposal_cid: String,
    pub archive_path: String,
}

/// Padded piece size for an unpadded size: every 127 bytes of payload take
/// 128 bytes, rounded up to a power of two.
pub fn padded_piece_size(unpadded: u64) -> u64 {
    let padded = (u128::from(unpadded) * 128).div_ceil(127);
    let padded = u64::try_from(padded).unwrap_or(u64::MAX);
    padded
        .checked_next_power_of_two()
        .unwrap_or(u64::MAX)
        .max(MIN_PIECE_SIZE)
}
