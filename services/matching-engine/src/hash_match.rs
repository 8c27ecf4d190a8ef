//! Hash matching (spec §4.4.3) — the highest-confidence match path.
//! Determines, for one source candidate, whether it has a unique,
//! sum-validated hash match among a set of same-asset targets.

use std::collections::HashMap;

use domain::{normalize_hash, SourceKind, TransactionCandidate};

/// Find the unique hash-matched target for `source` among `targets`
/// (already filtered to the same asset). Returns `None` if there is no hash
/// on the source, no hash match at all, the match is ambiguous, or the
/// multi-output sum validation fails — in every such case the caller must
/// fall back to heuristic scoring.
pub fn find_hash_match<'a>(source: &TransactionCandidate, targets: &'a [TransactionCandidate]) -> Option<&'a TransactionCandidate> {
    let source_hash = source.transaction_hash.as_deref()?;
    let normalized_source = normalize_hash(source_hash);

    // Rule 3: blockchain-to-blockchain hash equality is the same on-chain
    // event, not a transfer between accounts (spec P7).
    let eligible: Vec<&TransactionCandidate> = targets
        .iter()
        .filter(|t| {
            if source.source_kind == SourceKind::Blockchain && t.source_kind == SourceKind::Blockchain {
                return false;
            }
            // Exclude self-targets (spec §4.4.3 rule 5).
            if t.originating_transaction_id == source.originating_transaction_id {
                return false;
            }
            match &t.transaction_hash {
                Some(hash) => {
                    let normalized_target = normalize_hash(hash);
                    if !normalized_source.bases_equal(&normalized_target) {
                        return false;
                    }
                    // Rule 2: if both carry log-index suffixes, they must match.
                    match (normalized_source.log_index, normalized_target.log_index) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
                }
                None => false,
            }
        })
        .collect();

    if eligible.is_empty() {
        return None;
    }

    // Disambiguate by log index when multiple candidates share the base hash.
    let by_log_index: HashMap<Option<u64>, Vec<&TransactionCandidate>> = eligible.iter().fold(HashMap::new(), |mut map, t| {
        let idx = t.transaction_hash.as_deref().map(|h| normalize_hash(h).log_index).flatten();
        map.entry(idx).or_default().push(t);
        map
    });

    let disambiguated: Vec<&TransactionCandidate> = if by_log_index.len() == 1 {
        eligible
    } else if normalized_source.log_index.is_some() {
        by_log_index.get(&normalized_source.log_index).cloned().unwrap_or_default()
    } else {
        // Source has no suffix but targets disagree on theirs: ambiguous.
        return None;
    };

    if disambiguated.len() == 1 {
        return Some(disambiguated[0]);
    }

    // Rule 5: multiple targets sharing the hash — validate their sum does
    // not exceed the source amount (self-targets already excluded above).
    let sum = disambiguated
        .iter()
        .fold(domain::Money::ZERO, |acc, t| acc + t.amount);
    if sum.is_greater_than(source.amount) {
        return None;
    }

    // Non-unique even after sum validation passes: still ambiguous as a
    // *single* match (spec rule 4), fall back to heuristic scoring.
    None
}
