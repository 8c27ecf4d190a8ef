//! Per-pair scoring (spec §4.4.2). The confidence weights are hard-coded
//! named constants rather than config fields — see DESIGN.md's resolution
//! of open question O2.

use domain::{LinkType, MatchCriteria, Money, SourceKind, TransactionCandidate, TriState};
use ledger_config::MatchingConfig;

pub const ASSET_WEIGHT: f64 = 0.30;
pub const AMOUNT_WEIGHT: f64 = 0.40;
pub const TIMING_WEIGHT: f64 = 0.20;
pub const ADDRESS_BONUS_WEIGHT: f64 = 0.10;
pub const PROXIMITY_BONUS_WEIGHT: f64 = 0.10;

/// Tolerance around exact amount equality that maps to >= 0.98 similarity
/// (spec §4.4.2 "amount similarity").
const EXACT_AMOUNT_TOLERANCE_PCT: f64 = 0.0005;

fn is_exchange(kind: SourceKind) -> bool {
    matches!(kind, SourceKind::ExchangeApi | SourceKind::ExchangeCsv)
}

/// Derive the link type from each side's source kind (spec §3 "PotentialMatch").
pub fn derive_link_type(source_kind: SourceKind, target_kind: SourceKind) -> LinkType {
    match (is_exchange(source_kind), is_exchange(target_kind)) {
        (true, true) => LinkType::ExchangeToExchange,
        (true, false) => LinkType::ExchangeToBlockchain,
        (false, true) => LinkType::BlockchainToExchange,
        (false, false) => LinkType::BlockchainToBlockchain,
    }
}

/// Amount similarity in `[0, 1]`: `target / source`, clamped, with the
/// exact-equality tolerance band mapped to near-1.0. `target > source`
/// (modulo the tolerance band) means similarity is 0 — money can't appear
/// from nowhere.
pub fn amount_similarity(source: Money, target: Money) -> f64 {
    if source.is_zero() {
        return 0.0;
    }
    let ratio = target
        .divide(source)
        .map(|m| m.as_decimal())
        .and_then(|d| d.to_string().parse::<f64>().ok())
        .unwrap_or(0.0);

    if target.is_greater_than(source) {
        let excess_pct = target
            .saturating_sub(source)
            .divide(source)
            .map(|m| m.as_decimal())
            .and_then(|d| d.to_string().parse::<f64>().ok())
            .unwrap_or(f64::MAX);
        if excess_pct <= EXACT_AMOUNT_TOLERANCE_PCT {
            return 1.0;
        }
        return 0.0;
    }

    ratio.clamp(0.0, 1.0)
}

/// Tri-state address comparison (spec §4.4.2 "address match").
pub fn address_match(source: &TransactionCandidate, target: &TransactionCandidate) -> TriState {
    let source_to = source.to_address.as_deref();
    let target_from = target.from_address.as_deref();
    let target_to = target.to_address.as_deref();

    match (source_to, target_from.or(target_to)) {
        (Some(_), None) | (None, _) => TriState::Unknown,
        (Some(s), Some(_)) => {
            let matches_from = target_from.map(|f| f.eq_ignore_ascii_case(s)).unwrap_or(false);
            let matches_to = target_to.map(|t| t.eq_ignore_ascii_case(s)).unwrap_or(false);
            if matches_from || matches_to {
                TriState::True
            } else {
                TriState::False
            }
        }
    }
}

/// Build `MatchCriteria` and confidence for one (source, target) pair,
/// assuming the asset ids already match and the hash-match verdict has been
/// decided by the caller (spec §4.4.3 takes priority over this heuristic).
pub fn score_pair(
    source: &TransactionCandidate,
    target: &TransactionCandidate,
    hash_match: bool,
    config: &MatchingConfig,
) -> MatchCriteria {
    if hash_match {
        return MatchCriteria {
            asset_match: true,
            amount_similarity: amount_similarity(source.amount, target.amount),
            timing_valid: target.timestamp >= source.timestamp,
            timing_gap_hours: (target.timestamp - source.timestamp).num_seconds() as f64 / 3600.0,
            address_match: address_match(source, target),
            hash_match: true,
        };
    }

    let gap_hours = (target.timestamp - source.timestamp).num_seconds() as f64 / 3600.0;
    let timing_valid = gap_hours >= 0.0 && gap_hours <= config.time_window_hours;
    let similarity = amount_similarity(source.amount, target.amount);
    let address = address_match(source, target);

    MatchCriteria {
        asset_match: true,
        amount_similarity: similarity,
        timing_valid,
        timing_gap_hours: gap_hours,
        address_match: address,
        hash_match: false,
    }
}

/// Weighted confidence with hard floors (spec §4.4.2).
pub fn compute_confidence(criteria: &MatchCriteria, config: &MatchingConfig) -> f64 {
    if criteria.hash_match {
        return 1.0;
    }
    if !criteria.asset_match {
        return 0.0;
    }
    if criteria.address_match.is_false() {
        return 0.0;
    }
    if !criteria.timing_valid {
        // An out-of-window or backwards-in-time pair is not a candidate
        // match at all, not merely a lower-scored one (spec S3).
        return 0.0;
    }

    let mut confidence = ASSET_WEIGHT + AMOUNT_WEIGHT * criteria.amount_similarity + TIMING_WEIGHT;
    if criteria.address_match.is_true() {
        confidence += ADDRESS_BONUS_WEIGHT;
    }
    if criteria.timing_gap_hours <= config.close_timing_bonus_hours && criteria.timing_gap_hours >= 0.0 {
        confidence += PROXIMITY_BONUS_WEIGHT;
    }

    confidence.clamp(0.0, 1.0)
}
