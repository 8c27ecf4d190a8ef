//! Link validation before persistence (spec §4.4.5).

use std::str::FromStr;

use domain::{Money, PotentialMatch, TransactionLink, VarianceMetadata};
use ledger_config::MatchingConfig;
use rust_decimal::Decimal;

use crate::error::{MatchingError, Result};

/// Validate a `PotentialMatch` and build the `VarianceMetadata` for
/// persistence, or reject it with the reason spec §4.4.5 names.
pub fn validate_match(m: &PotentialMatch, config: &MatchingConfig) -> Result<VarianceMetadata> {
    if !m.source_amount.is_greater_than(Money::ZERO) {
        return Err(MatchingError::MissingSourceAmount);
    }
    if !m.target_amount.is_greater_than(Money::ZERO) {
        return Err(MatchingError::InvalidTargetAmount);
    }

    let mut target_excess_allowed = false;
    let mut target_excess_pct = None;

    if m.target_amount.is_greater_than(m.source_amount) {
        let excess = m.target_amount.saturating_sub(m.source_amount);
        let excess_pct = excess
            .divide(m.source_amount)
            .unwrap_or(Money::ZERO);
        let tolerance = Money::from_decimal(
            Decimal::from_str(&config.hash_excess_tolerance_pct.to_string()).unwrap_or_default(),
        );

        if !(m.criteria.hash_match && excess_pct.is_less_than_or_equal(tolerance)) {
            return Err(MatchingError::TargetExceedsSource {
                source: m.source_amount.to_string(),
                target: m.target_amount.to_string(),
            });
        }
        target_excess_allowed = true;
        target_excess_pct = Some(excess_pct.multiply_scalar(Decimal::from(100)));
    }

    let variance = m.source_amount.saturating_sub(m.target_amount);
    let variance_ratio = variance.divide(m.source_amount).unwrap_or(Money::ZERO);
    let variance_pct_value = variance_ratio.multiply_scalar(Decimal::from(100));

    let variance_pct_f64: f64 = variance_pct_value.as_decimal().to_string().parse().unwrap_or(0.0);
    if variance_pct_f64 > config.max_variance_pct * 100.0 {
        return Err(MatchingError::VarianceExceedsThreshold {
            variance_pct: variance_pct_f64,
        });
    }

    Ok(VarianceMetadata {
        variance,
        variance_pct: Money::from_decimal(
            variance_pct_value
                .as_decimal()
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointNearestEven),
        ),
        implied_fee: variance,
        target_excess_allowed,
        target_excess_pct,
    })
}

/// Construct the final `TransactionLink` row from a validated match.
pub fn build_link(
    id: domain::LinkId,
    m: &PotentialMatch,
    variance: VarianceMetadata,
    status: domain::LinkStatus,
    reviewer: impl Into<String>,
    reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
) -> TransactionLink {
    TransactionLink {
        id,
        source_transaction_id: m.source_transaction_id,
        target_transaction_id: m.target_transaction_id,
        asset_symbol: m.asset_symbol.clone(),
        source_amount: m.source_amount,
        target_amount: m.target_amount,
        status,
        reviewer: reviewer.into(),
        reviewed_at,
        link_type: m.link_type,
        variance,
    }
}
