//! Processor contract (spec §6 "Processor contract (adapter-provided)").

use domain::{RawRecord, UniversalTransaction};

/// A pure, deterministic transform from raw records (plus session metadata)
/// to universal transactions. No I/O — processors must be safe to call
/// outside of any session's active runner task (e.g. from the matching
/// engine's read path, or from a batch reprocessing tool).
pub trait Processor: Send + Sync {
    fn process(
        &self,
        raw_records: &[RawRecord],
        session_metadata: &serde_json::Value,
    ) -> Result<Vec<UniversalTransaction>, String>;
}
