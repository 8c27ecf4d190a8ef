//! Importer contract (spec §6 "Importer contract (adapter-provided)").
//!
//! The source specification's `AsyncIterator<Result<Batch, Error>>` is
//! realized here as a producer task writing to a bounded channel (spec §9
//! design note: "the latter composes better with cancellation"). The runner
//! drains the channel; dropping the receiver signals the producer to stop at
//! its next suspension point.

use std::collections::HashMap;

use domain::{CursorState, RawRecord, StreamType};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Parameters handed to `import_streaming`. Exactly which fields are
/// meaningful depends on the adapter: blockchain importers read `address`
/// and `cursor`; exchange-API importers read `credentials` and `cursor`;
/// exchange-CSV importers read `csv_directories`.
#[derive(Debug, Clone, Default)]
pub struct ImportParams {
    pub address: Option<String>,
    pub credentials: Option<Value>,
    pub csv_directories: Option<Vec<String>>,
    pub cursor: HashMap<StreamType, CursorState>,
    pub provider_name: Option<String>,
}

/// One yield from an adapter's streaming importer.
#[derive(Debug, Clone)]
pub struct Batch {
    pub raw_transactions: Vec<RawRecord>,
    pub stream_type: StreamType,
    pub cursor: CursorState,
    pub is_complete: bool,
    pub warnings: Vec<String>,
    pub cursor_updates: HashMap<StreamType, CursorState>,
}

impl Batch {
    pub fn new(raw_transactions: Vec<RawRecord>, stream_type: impl Into<String>, cursor: CursorState) -> Self {
        Self {
            raw_transactions,
            stream_type: stream_type.into(),
            cursor,
            is_complete: false,
            warnings: Vec::new(),
            cursor_updates: HashMap::new(),
        }
    }

    pub fn complete(mut self) -> Self {
        self.is_complete = true;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_cursor_updates(mut self, updates: HashMap<StreamType, CursorState>) -> Self {
        self.cursor_updates = updates;
        self
    }
}

/// Carried by an exchange importer that validated some records, then hit one
/// it could not process (spec §4.3 "Partial-failure path").
#[derive(Debug, Clone)]
pub struct PartialImportError {
    pub successful_records: Vec<RawRecord>,
    pub failing_item: Value,
    pub last_good_cursor_updates: HashMap<StreamType, CursorState>,
    pub message: String,
}

/// Everything an importer can yield as an `Err` from its batch stream.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("{0}")]
    Adapter(String),
    #[error("partial import failure: {}", .0.message)]
    Partial(PartialImportError),
}

pub type BatchResult = std::result::Result<Batch, ImportError>;

/// A streaming importer: `importStreaming` in spec §6. Implementations spawn
/// a producer task and return the receiving half of a bounded channel so the
/// runner can drain it under backpressure (spec §5 "Backpressure").
#[async_trait::async_trait]
pub trait Importer: Send + Sync {
    async fn import_streaming(
        &self,
        params: ImportParams,
        cancellation: CancellationToken,
    ) -> mpsc::Receiver<BatchResult>;
}
