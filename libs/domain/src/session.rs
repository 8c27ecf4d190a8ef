//! Import session lifecycle (spec §3 "ImportSession").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, SessionId};

/// One run of the runner against one account; the unit of resumability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    pub id: SessionId,
    pub account_id: AccountId,
    pub status: SessionStatus,
    pub transactions_imported: u64,
    pub transactions_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    /// Free-form metadata: warnings, partial-import payloads, etc.
    pub metadata: serde_json::Value,
}

/// Raised when an illegal session transition is attempted. Per spec §9
/// design notes, invariant violations panic rather than returning a
/// recoverable error — this type exists only so the panic message is
/// structured and the condition is unit-testable via `catch_unwind`.
#[derive(Debug, thiserror::Error)]
#[error("illegal import session transition: {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

impl ImportSession {
    pub fn start_new(account_id: AccountId) -> Self {
        Self {
            id: SessionId::new(),
            account_id,
            status: SessionStatus::Started,
            transactions_imported: 0,
            transactions_skipped: 0,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// Resume an existing incomplete session: started -> started.
    pub fn resume(&mut self) -> Result<(), IllegalTransition> {
        self.transition(SessionStatus::Started)
    }

    pub fn accumulate(&mut self, imported: u64, skipped: u64) {
        debug_assert_eq!(self.status, SessionStatus::Started);
        self.transactions_imported += imported;
        self.transactions_skipped += skipped;
    }

    pub fn complete(&mut self) -> Result<(), IllegalTransition> {
        self.transition(SessionStatus::Completed)?;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error_message: impl Into<String>) -> Result<(), IllegalTransition> {
        self.transition(SessionStatus::Failed)?;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error_message.into());
        Ok(())
    }

    /// Enforce the transition table of spec §3 invariant (3): only
    /// started->started, started->completed, started->failed. No revival
    /// from completed.
    fn transition(&mut self, to: SessionStatus) -> Result<(), IllegalTransition> {
        let allowed = matches!(
            (self.status, to),
            (SessionStatus::Started, SessionStatus::Started)
                | (SessionStatus::Started, SessionStatus::Completed)
                | (SessionStatus::Started, SessionStatus::Failed)
        );
        if !allowed {
            return Err(IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Only a `Started` session is resumable. `Completed` and `Failed` are
    /// both terminal — a re-run after either starts a fresh session.
    pub fn is_incomplete(&self) -> bool {
        self.status == SessionStatus::Started
    }
}
