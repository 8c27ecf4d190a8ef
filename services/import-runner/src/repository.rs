//! Repository contracts the runner depends on (spec §6). Implementations
//! live in the persistence collaborator, out of scope for this crate; the
//! in-memory ones under `tests/integration` exist purely to exercise the
//! runner end to end.

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{Account, AccountId, CursorState, ImportSession, RawRecord, SaveBatchResult, SessionId, StreamType, TransactionLink};

use crate::error::RepositoryError;

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, account_id: AccountId) -> RepoResult<Account>;

    /// Mutated only by the single active task for this account (spec §5
    /// "Account rows: mutated only by its single active task").
    async fn update_cursor(&self, account_id: AccountId, stream_type: &str, cursor: CursorState) -> RepoResult<()>;
}

#[async_trait]
pub trait ImportSessionRepository: Send + Sync {
    async fn create(&self, session: ImportSession) -> RepoResult<ImportSession>;
    async fn update(&self, session: ImportSession) -> RepoResult<ImportSession>;
    async fn finalize(&self, session: ImportSession) -> RepoResult<ImportSession>;

    /// At most one row per account should ever satisfy `status == started`
    /// — `failed` is terminal, not resumable, so a re-run after a failure
    /// starts a fresh session rather than reviving it.
    async fn find_latest_incomplete(&self, account_id: AccountId) -> RepoResult<Option<ImportSession>>;

    async fn find_by_id(&self, session_id: SessionId) -> RepoResult<ImportSession>;
}

#[async_trait]
pub trait RawDataRepository: Send + Sync {
    /// Content-hash idempotent insert (spec §3 RawRecord invariant).
    async fn save_batch(&self, session_id: SessionId, records: Vec<RawRecord>) -> RepoResult<SaveBatchResult>;

    async fn count_by_stream_type(&self, account_id: AccountId) -> RepoResult<HashMap<StreamType, u64>>;
}

#[async_trait]
pub trait TransactionLinkRepository: Send + Sync {
    async fn save(&self, link: TransactionLink) -> RepoResult<domain::LinkId>;
}
