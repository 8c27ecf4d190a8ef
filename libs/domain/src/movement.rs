//! Ledger-level projections consumed by the matching engine
//! (spec §3 "Movement", "TransactionCandidate").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, TransactionId};
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Blockchain,
    ExchangeApi,
    ExchangeCsv,
}

/// A directional asset change extracted from a universal transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub transaction_id: TransactionId,
    pub source_name: String,
    pub source_kind: SourceKind,
    pub asset_id: AssetId,
    pub asset_symbol: String,
    /// The gross amount as originally reported by the source.
    pub gross_amount: Money,
    /// The amount net of any on-chain fee already discounted by the
    /// adapter, if known.
    pub net_amount: Option<Money>,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub transaction_hash: Option<String>,
}

impl Movement {
    /// `netAmount` fallback `grossAmount`, per spec §4.4.6.
    pub fn effective_amount(&self) -> Money {
        self.net_amount.unwrap_or(self.gross_amount)
    }
}

/// A single directional movement prepared for matching; id =
/// `(originating_transaction_id, direction, asset)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub originating_transaction_id: TransactionId,
    pub direction: Direction,
    pub asset_id: AssetId,
    pub asset_symbol: String,
    pub source_name: String,
    pub source_kind: SourceKind,
    /// The amount offered for matching. For blockchain outflows, this is the
    /// already fee/change-adjusted amount of spec §4.4.6, not the raw
    /// movement amount.
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub transaction_hash: Option<String>,
}

impl TransactionCandidate {
    /// Explode a movement into a candidate carrying its own effective
    /// amount. Neutral-direction movements are not candidates — callers
    /// should filter by direction before invoking this.
    pub fn from_movement(movement: &Movement) -> Self {
        Self {
            originating_transaction_id: movement.transaction_id,
            direction: movement.direction,
            asset_id: movement.asset_id.clone(),
            asset_symbol: movement.asset_symbol.clone(),
            source_name: movement.source_name.clone(),
            source_kind: movement.source_kind,
            amount: movement.effective_amount(),
            timestamp: movement.timestamp,
            from_address: movement.from_address.clone(),
            to_address: movement.to_address.clone(),
            transaction_hash: movement.transaction_hash.clone(),
        }
    }
}

/// The normalized, processor-produced record consumed by the matching
/// engine (spec GLOSSARY "Universal transaction"). One `UniversalTransaction`
/// groups the movements a processor derived from one or more raw records
/// that share an underlying external event (e.g. one on-chain transaction,
/// or one exchange trade/withdrawal/deposit row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversalTransaction {
    pub id: TransactionId,
    pub source_name: String,
    pub source_kind: SourceKind,
    pub timestamp: DateTime<Utc>,
    pub movements: Vec<Movement>,
}

impl UniversalTransaction {
    pub fn new(id: TransactionId, source_name: impl Into<String>, source_kind: SourceKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            source_name: source_name.into(),
            source_kind,
            timestamp,
            movements: Vec::new(),
        }
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movements.push(movement);
        self
    }

    /// Candidate construction (spec §4.4.1): one candidate per
    /// (direction, asset) movement, dropping `Direction::Neutral`.
    pub fn candidates(&self) -> Vec<TransactionCandidate> {
        self.movements
            .iter()
            .filter(|m| m.direction != Direction::Neutral)
            .map(TransactionCandidate::from_movement)
            .collect()
    }
}
