//! Account and cursor state (spec §3 "Account", "CursorState").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::AccountId;

/// A named sub-sequence within a source, each with its own cursor
/// (`normal`, `internal`, `token`, `ledger`, `trade`, `deposit`, ...).
pub type StreamType = String;

/// The kind of external source an account draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountKind {
    Blockchain,
    ExchangeApi,
    ExchangeCsv,
}

/// Adapter-defined, fully opaque-to-the-runner resumption token.
///
/// The runner never parses `primary_key`; it round-trips it verbatim. The
/// only field the runner reads is `total_fetched`, to emit a monotonicity
/// count on `batch.saved` events (spec P1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    /// Opaque primary key: a timestamp, block number, offset, or id,
    /// serialized however the adapter prefers.
    pub primary_key: serde_json::Value,
    /// Used for boundary tiebreaks when two records share a primary key.
    pub last_transaction_id: Option<String>,
    /// Monotone total-records-fetched counter for this (account, stream).
    pub total_fetched: u64,
}

impl CursorState {
    pub fn new(primary_key: serde_json::Value, total_fetched: u64) -> Self {
        Self {
            primary_key,
            last_transaction_id: None,
            total_fetched,
        }
    }

    pub fn with_last_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.last_transaction_id = Some(id.into());
        self
    }
}

/// A user-owned data source: a blockchain wallet, an exchange API key, or a
/// directory of exchange CSV exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub kind: AccountKind,
    /// Source name, e.g. "bitcoin", "kraken".
    pub source_name: String,
    /// Adapter-specific identifier: wallet address, API key handle, or a
    /// list of CSV directories (joined, adapter decides the shape).
    pub identifier: String,
    pub preferred_provider: Option<String>,
    /// Durable cursor state, keyed by stream type. Mutated only by the
    /// runner (cursor updates) or config changes (provider hint) — see
    /// spec §5 "Account rows: mutated only by its single active task".
    pub last_cursor: HashMap<StreamType, CursorState>,
}

impl Account {
    pub fn new(kind: AccountKind, source_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            kind,
            source_name: source_name.into(),
            identifier: identifier.into(),
            preferred_provider: None,
            last_cursor: HashMap::new(),
        }
    }

    pub fn cursor_for(&self, stream: &str) -> Option<&CursorState> {
        self.last_cursor.get(stream)
    }
}
