//! Top-level matching engine orchestration (spec §4.4).

use chrono::Utc;
use domain::{LinkId, LinkStatus, PotentialMatch, TransactionLink, UniversalTransaction};
use ledger_config::MatchingConfig;
use tracing::debug;

use crate::candidates::build_candidates;
use crate::dedup::{deduplicate_and_confirm, Disposition};
use crate::error::Result;
use crate::hash_match::find_hash_match;
use crate::link::{build_link, validate_match};
use crate::scoring::{compute_confidence, derive_link_type, score_pair};

pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// `findPotentialMatches` (spec §4.4): score every same-asset
    /// (source, target) pair, preferring the hash-match path where it
    /// applies unambiguously.
    pub fn find_potential_matches(&self, transactions: &[UniversalTransaction]) -> Vec<PotentialMatch> {
        let candidate_set = build_candidates(transactions);
        let mut matches = Vec::new();

        for source in &candidate_set.sources {
            let same_asset_targets: Vec<_> = candidate_set
                .targets
                .iter()
                .filter(|t| t.asset_id == source.asset_id)
                .cloned()
                .collect();

            if same_asset_targets.is_empty() {
                continue;
            }

            let hash_target = find_hash_match(source, &same_asset_targets);

            if let Some(target) = hash_target {
                let criteria = score_pair(source, target, true, &self.config);
                let confidence = compute_confidence(&criteria, &self.config);
                matches.push(PotentialMatch {
                    source_transaction_id: source.originating_transaction_id,
                    target_transaction_id: target.originating_transaction_id,
                    source_amount: source.amount,
                    target_amount: target.amount,
                    asset_symbol: source.asset_symbol.clone(),
                    criteria,
                    confidence,
                    link_type: derive_link_type(source.source_kind, target.source_kind),
                });
                continue;
            }

            for target in &same_asset_targets {
                let criteria = score_pair(source, target, false, &self.config);
                let confidence = compute_confidence(&criteria, &self.config);
                if confidence <= 0.0 {
                    continue;
                }
                matches.push(PotentialMatch {
                    source_transaction_id: source.originating_transaction_id,
                    target_transaction_id: target.originating_transaction_id,
                    source_amount: source.amount,
                    target_amount: target.amount,
                    asset_symbol: source.asset_symbol.clone(),
                    criteria,
                    confidence,
                    link_type: derive_link_type(source.source_kind, target.source_kind),
                });
            }
        }

        debug!(count = matches.len(), "scored candidate matches");
        matches
    }

    /// `deduplicateAndConfirm` (spec §4.4.4) followed by per-link validation
    /// (spec §4.4.5). Matches that fail validation are dropped with the
    /// reason logged, never silently persisted.
    pub fn build_links(&self, matches: Vec<PotentialMatch>) -> Vec<TransactionLink> {
        deduplicate_and_confirm(matches, &self.config)
            .into_iter()
            .filter_map(|(m, disposition)| match validate_match(&m, &self.config) {
                Ok(variance) => {
                    let (status, reviewer, reviewed_at) = match disposition {
                        Disposition::Confirmed => (LinkStatus::Confirmed, "auto".to_string(), Some(Utc::now())),
                        Disposition::Suggested => (LinkStatus::Suggested, "auto".to_string(), None),
                    };
                    Some(build_link(LinkId::new(), &m, variance, status, reviewer, reviewed_at))
                }
                Err(err) => {
                    debug!(
                        source = %m.source_transaction_id,
                        target = %m.target_transaction_id,
                        error = %err,
                        "link rejected by validation"
                    );
                    None
                }
            })
            .collect()
    }

    /// Validate and build a single link for a caller that already holds one
    /// specific `PotentialMatch` (e.g. a user confirming a `suggested` match).
    pub fn create_transaction_link(
        &self,
        m: &PotentialMatch,
        status: LinkStatus,
        reviewer: impl Into<String>,
    ) -> Result<TransactionLink> {
        let variance = validate_match(m, &self.config)?;
        let reviewed_at = matches!(status, LinkStatus::Confirmed).then(Utc::now);
        Ok(build_link(LinkId::new(), m, variance, status, reviewer, reviewed_at))
    }
}
