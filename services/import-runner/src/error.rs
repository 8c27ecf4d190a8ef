//! Runner-level error taxonomy (spec §4.3, §7).

use adapter_core::AdapterError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The adapter's batch stream yielded a hard error.
    #[error("import failed for session {session_id}: {message}")]
    ImportFailed { session_id: String, message: String },

    /// A batch carried non-empty warnings, which this system treats as a
    /// hard failure per the literal source policy (spec §9 O1).
    #[error("batch for session {session_id} carried {warning_count} warning(s), treated as fatal")]
    WarningsEmitted { session_id: String, warning_count: usize },

    #[error("raw-record sink rejected batch for session {session_id}: {source}")]
    SinkWriteFailed {
        session_id: String,
        #[source]
        source: RepositoryError,
    },

    #[error("cursor commit failed for session {session_id}: {source}")]
    CursorCommitFailed {
        session_id: String,
        #[source]
        source: RepositoryError,
    },

    /// An exchange importer validated some records then hit an unrecoverable
    /// one; the runner salvaged what it could (spec §4.3 partial-failure path).
    #[error("partial import for session {session_id}: {message} (re-run to resume)")]
    PartialImport { session_id: String, message: String },

    #[error("import cancelled for session {session_id}")]
    Cancelled { session_id: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors surfaced by the repository contracts of spec §6. The runner
/// depends only on this trait-object-friendly error, never on a concrete
/// storage engine's error type.
#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}
