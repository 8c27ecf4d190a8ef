//! In-memory repository implementations (spec §6). Hash maps behind a
//! mutex, not mocks of the contract — these are real, if non-durable,
//! implementations of `AccountRepository`, `ImportSessionRepository`,
//! `RawDataRepository`, and `TransactionLinkRepository`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use domain::{Account, AccountId, CursorState, ImportSession, LinkId, RawRecord, SaveBatchResult, SessionId, StreamType, TransactionLink};
use import_runner::{AccountRepository, ImportSessionRepository, RawDataRepository, RepoResult, RepositoryError, TransactionLinkRepository};

#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccounts {
    pub fn new(seed: Vec<Account>) -> Self {
        let accounts = seed.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    pub fn snapshot(&self, account_id: AccountId) -> Account {
        self.accounts.lock().unwrap().get(&account_id).cloned().expect("account exists")
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_by_id(&self, account_id: AccountId) -> RepoResult<Account> {
        self.accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(account_id.to_string()))
    }

    async fn update_cursor(&self, account_id: AccountId, stream_type: &str, cursor: CursorState) -> RepoResult<()> {
        let mut guard = self.accounts.lock().unwrap();
        let account = guard
            .get_mut(&account_id)
            .ok_or_else(|| RepositoryError::NotFound(account_id.to_string()))?;
        account.last_cursor.insert(stream_type.to_string(), cursor);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessions {
    sessions: Mutex<HashMap<SessionId, ImportSession>>,
}

#[async_trait]
impl ImportSessionRepository for InMemorySessions {
    async fn create(&self, session: ImportSession) -> RepoResult<ImportSession> {
        self.sessions.lock().unwrap().insert(session.id, session.clone());
        Ok(session)
    }

    async fn update(&self, session: ImportSession) -> RepoResult<ImportSession> {
        self.sessions.lock().unwrap().insert(session.id, session.clone());
        Ok(session)
    }

    async fn finalize(&self, session: ImportSession) -> RepoResult<ImportSession> {
        self.sessions.lock().unwrap().insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_latest_incomplete(&self, account_id: AccountId) -> RepoResult<Option<ImportSession>> {
        let guard = self.sessions.lock().unwrap();
        Ok(guard
            .values()
            .filter(|s| s.account_id == account_id && s.is_incomplete())
            .max_by_key(|s| s.started_at)
            .cloned())
    }

    async fn find_by_id(&self, session_id: SessionId) -> RepoResult<ImportSession> {
        self.sessions
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(session_id.to_string()))
    }
}

/// Content-hash-idempotent sink (spec §3 `RawRecord` invariant), keyed per
/// account so `countByStreamType` can answer without scanning every session.
/// Resolves `session_id -> account_id` through the sessions store it's
/// constructed with, the same way a real adapter-backed sink would need a
/// session lookup to know which account a batch belongs to.
pub struct InMemoryRawData {
    sessions: Arc<InMemorySessions>,
    records: Mutex<HashMap<AccountId, HashMap<String, RawRecord>>>,
}

impl InMemoryRawData {
    pub fn new(sessions: Arc<InMemorySessions>) -> Self {
        Self {
            sessions,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn total_for(&self, account_id: AccountId) -> usize {
        self.records.lock().unwrap().get(&account_id).map(HashMap::len).unwrap_or(0)
    }
}

#[async_trait]
impl RawDataRepository for InMemoryRawData {
    async fn save_batch(&self, session_id: SessionId, records: Vec<RawRecord>) -> RepoResult<SaveBatchResult> {
        let session = self.sessions.find_by_id(session_id).await?;
        let mut guard = self.records.lock().unwrap();
        let bucket = guard.entry(session.account_id).or_default();

        let mut inserted = 0u64;
        let mut skipped = 0u64;
        for record in records {
            if bucket.contains_key(&record.content_hash) {
                skipped += 1;
            } else {
                inserted += 1;
                bucket.insert(record.content_hash.clone(), record);
            }
        }
        Ok(SaveBatchResult::new(inserted, skipped))
    }

    async fn count_by_stream_type(&self, account_id: AccountId) -> RepoResult<HashMap<StreamType, u64>> {
        let guard = self.records.lock().unwrap();
        let mut counts: HashMap<StreamType, u64> = HashMap::new();
        if let Some(bucket) = guard.get(&account_id) {
            for record in bucket.values() {
                *counts.entry(record.stream_type.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryTransactionLinks {
    links: Mutex<Vec<TransactionLink>>,
}

impl InMemoryTransactionLinks {
    pub fn all(&self) -> Vec<TransactionLink> {
        self.links.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionLinkRepository for InMemoryTransactionLinks {
    async fn save(&self, link: TransactionLink) -> RepoResult<LinkId> {
        let id = link.id;
        self.links.lock().unwrap().push(link);
        Ok(id)
    }
}
