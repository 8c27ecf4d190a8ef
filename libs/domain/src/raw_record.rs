//! The external-record projection (spec §3 "RawRecord").

use serde::{Deserialize, Serialize};

use crate::account::StreamType;
use crate::ids::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processed,
    Failed,
}

/// One external record as produced by a provider, prior to processor
/// normalization into a [`crate::movement::Movement`].
///
/// Invariant (spec §3): within one account, `(source_name, content_hash)` is
/// unique. The content hash is computed by the adapter — the core never
/// looks inside it, only compares it for equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub session_id: SessionId,
    pub source_name: String,
    pub content_hash: String,
    pub stream_type: StreamType,
    pub payload: serde_json::Value,
    pub status: ProcessingStatus,
}

impl RawRecord {
    pub fn new(
        session_id: SessionId,
        source_name: impl Into<String>,
        content_hash: impl Into<String>,
        stream_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            session_id,
            source_name: source_name.into(),
            content_hash: content_hash.into(),
            stream_type: stream_type.into(),
            payload,
            status: ProcessingStatus::Pending,
        }
    }
}

/// Result of a content-hash-idempotent batch insert (spec §6
/// `RawDataRepository.saveBatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveBatchResult {
    pub inserted: u64,
    pub skipped: u64,
}

impl SaveBatchResult {
    pub fn new(inserted: u64, skipped: u64) -> Self {
        Self { inserted, skipped }
    }
}

impl std::ops::Add for SaveBatchResult {
    type Output = SaveBatchResult;
    fn add(self, rhs: SaveBatchResult) -> SaveBatchResult {
        SaveBatchResult {
            inserted: self.inserted + rhs.inserted,
            skipped: self.skipped + rhs.skipped,
        }
    }
}
