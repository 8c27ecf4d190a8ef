//! Candidate construction (spec §4.4.1) plus the outflow-adjustment
//! preprocessing step (§4.4.6) that blockchain source candidates go through
//! before being offered to scoring.

use domain::{Direction, Money, SourceKind, TransactionCandidate, TransactionId, UniversalTransaction};

use crate::outflow_adjust::adjust_outflow_group;

/// Sources (outflows) and targets (inflows) derived from a batch of
/// universal transactions, ready for pairwise scoring.
pub struct CandidateSet {
    pub sources: Vec<TransactionCandidate>,
    pub targets: Vec<TransactionCandidate>,
}

/// Explode every transaction into candidates, partition by direction, and
/// apply the blockchain outflow-group adjustment to source candidates
/// sharing a (transaction hash, asset) group.
pub fn build_candidates(transactions: &[UniversalTransaction]) -> CandidateSet {
    let mut sources = Vec::new();
    let mut targets = Vec::new();

    for tx in transactions {
        for candidate in tx.candidates() {
            match candidate.direction {
                Direction::Out => sources.push(candidate),
                Direction::In => targets.push(candidate),
                Direction::Neutral => unreachable!("UniversalTransaction::candidates filters neutral movements"),
            }
        }
    }

    apply_outflow_adjustments(transactions, &mut sources);

    CandidateSet { sources, targets }
}

/// Rewrite blockchain source candidates in place per §4.4.6: group by
/// (transaction_hash, asset), compute `outflowSum - inflowSum` across the
/// whole group, and collapse the group down to its representative outflow
/// (the lowest transaction id), carrying the adjusted amount — the other
/// outflows in the group are dropped. A non-positive adjustment drops the
/// whole group instead.
fn apply_outflow_adjustments(transactions: &[UniversalTransaction], sources: &mut Vec<TransactionCandidate>) {
    use std::collections::HashMap;

    let mut groups: HashMap<(String, String), Vec<&domain::Movement>> = HashMap::new();
    for tx in transactions {
        if tx.source_kind != SourceKind::Blockchain {
            continue;
        }
        for movement in &tx.movements {
            if let Some(hash) = &movement.transaction_hash {
                groups
                    .entry((hash.clone(), movement.asset_id.as_str().to_string()))
                    .or_default()
                    .push(movement);
            }
        }
    }

    let mut adjustments: HashMap<TransactionId, Money> = HashMap::new();
    let mut drop: std::collections::HashSet<TransactionId> = std::collections::HashSet::new();

    for ((_hash, _asset), movements) in groups {
        match adjust_outflow_group(&movements) {
            crate::outflow_adjust::OutflowAdjustment::NoAdjustment => {}
            crate::outflow_adjust::OutflowAdjustment::Skip { .. } => {
                for m in movements.iter().filter(|m| m.direction == Direction::Out) {
                    drop.insert(m.transaction_id);
                }
            }
            crate::outflow_adjust::OutflowAdjustment::Adjusted {
                adjusted_amount,
                representative_tx_id,
                ..
            } => {
                for m in movements.iter().filter(|m| m.direction == Direction::Out) {
                    if m.transaction_id == representative_tx_id {
                        adjustments.insert(m.transaction_id, adjusted_amount);
                    } else {
                        drop.insert(m.transaction_id);
                    }
                }
            }
        }
    }

    sources.retain(|c| !drop.contains(&c.originating_transaction_id));
    for candidate in sources.iter_mut() {
        if let Some(adjusted) = adjustments.get(&candidate.originating_transaction_id) {
            candidate.amount = *adjusted;
        }
    }
}
