//! Deduplication & confirmation (spec §4.4.4).

use domain::PotentialMatch;
use ledger_config::MatchingConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Confirmed,
    Suggested,
}

/// Filter by the minimum thresholds, keep only the highest-confidence
/// source per target (ties broken by insertion order: last-write-wins),
/// then partition by the auto-confirm threshold.
///
/// Postcondition (spec P8): each target transaction id appears in at most
/// one returned match.
pub fn deduplicate_and_confirm(matches: Vec<PotentialMatch>, config: &MatchingConfig) -> Vec<(PotentialMatch, Disposition)> {
    let eligible: Vec<PotentialMatch> = matches
        .into_iter()
        .filter(|m| m.confidence >= config.min_confidence && m.criteria.amount_similarity >= config.min_amount_similarity)
        .collect();

    let mut best_by_target: std::collections::HashMap<domain::TransactionId, PotentialMatch> = std::collections::HashMap::new();
    for m in eligible {
        match best_by_target.get(&m.target_transaction_id) {
            Some(existing) if existing.confidence > m.confidence => {}
            _ => {
                best_by_target.insert(m.target_transaction_id, m);
            }
        }
    }

    best_by_target
        .into_values()
        .map(|m| {
            let disposition = if m.confidence >= config.auto_confirm_threshold {
                Disposition::Confirmed
            } else {
                Disposition::Suggested
            };
            (m, disposition)
        })
        .collect()
}
