//! Matching-engine output types (spec §3 "PotentialMatch", "TransactionLink").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LinkId, TransactionId};
use crate::money::Money;

/// A tri-state match result: known-true, known-false, or unknown because one
/// side lacks the evidence to compare (spec §4.4.2 "address match").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    pub fn is_true(&self) -> bool {
        matches!(self, TriState::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, TriState::False)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    ExchangeToBlockchain,
    BlockchainToExchange,
    BlockchainToBlockchain,
    ExchangeToExchange,
}

/// Per-pair scoring evidence (spec §4.4.2, §4.4.3) plus the derived
/// confidence. Confidence is in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub asset_match: bool,
    pub amount_similarity: f64,
    pub timing_valid: bool,
    pub timing_gap_hours: f64,
    pub address_match: TriState,
    pub hash_match: bool,
}

/// An ordered (source, target) pair proposed by the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialMatch {
    pub source_transaction_id: TransactionId,
    pub target_transaction_id: TransactionId,
    pub source_amount: Money,
    pub target_amount: Money,
    pub asset_symbol: String,
    pub criteria: MatchCriteria,
    pub confidence: f64,
    pub link_type: LinkType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Suggested,
    Confirmed,
}

/// Variance metadata attached to a persisted link (spec §4.4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceMetadata {
    pub variance: Money,
    /// Percentage, expressed with 2 decimal places (e.g. `5.00` = 5%).
    pub variance_pct: Money,
    pub implied_fee: Money,
    pub target_excess_allowed: bool,
    pub target_excess_pct: Option<Money>,
}

/// The persisted result of an auto-confirmed or user-confirmed match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLink {
    pub id: LinkId,
    pub source_transaction_id: TransactionId,
    pub target_transaction_id: TransactionId,
    pub asset_symbol: String,
    pub source_amount: Money,
    pub target_amount: Money,
    pub status: LinkStatus,
    /// `"auto"` for engine-confirmed links, or a user id string.
    pub reviewer: String,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub link_type: LinkType,
    pub variance: VarianceMetadata,
}
