//! Matching-engine error taxonomy (spec §4.4.5, §7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatchingError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchingError {
    #[error("missing movement data: source amount is not positive")]
    MissingSourceAmount,

    #[error("invalid transaction data: target amount is not positive")]
    InvalidTargetAmount,

    #[error("target amount {target} exceeds source amount {source} beyond the hash-confirmed tolerance")]
    TargetExceedsSource { source: String, target: String },

    #[error("variance {variance_pct:.2}% exceeds 10% threshold")]
    VarianceExceedsThreshold { variance_pct: f64 },
}
