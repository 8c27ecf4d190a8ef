//! Property suites exercising `libs/domain` and `services/matching-engine`
//! invariants directly, with no I/O.

use std::collections::HashSet;

use chrono::Duration;
use domain::{
    normalize_hash, AccountId, Direction, ImportSession, LinkType, MatchCriteria, Money, Movement,
    PotentialMatch, SaveBatchResult, SessionId, SourceKind, TransactionCandidate, TransactionId, TriState,
    UniversalTransaction,
};
use matching_engine::{dedup::deduplicate_and_confirm, hash_match::find_hash_match, MatchingEngine};
use proptest::prelude::*;
use property_strategies::{
    asset_id_strategy, hex_hash_strategy, money_strategy, non_hex_hash_strategy, raw_record_batch_strategy,
    timestamp_strategy,
};

/// A content-hash-idempotent in-memory sink, matching the contract
/// `RawDataRepository::save_batch` is expected to satisfy. Kept local to
/// this crate (no async, no trait object) so properties P2/P3 can be
/// checked without pulling in the runner's I/O machinery.
#[derive(Default)]
struct DedupSink {
    seen: HashSet<String>,
}

impl DedupSink {
    fn save_batch(&mut self, records: &[domain::RawRecord]) -> SaveBatchResult {
        let mut inserted = 0u64;
        let mut skipped = 0u64;
        for record in records {
            if self.seen.insert(record.content_hash.clone()) {
                inserted += 1;
            } else {
                skipped += 1;
            }
        }
        SaveBatchResult::new(inserted, skipped)
    }
}

proptest! {
    /// Cursor monotonicity: accumulating any sequence of non-negative
    /// (imported, skipped) increments never decreases the running totals.
    #[test]
    fn session_totals_are_monotone(increments in proptest::collection::vec((0u64..1000, 0u64..1000), 1..50)) {
        let mut session = ImportSession::start_new(AccountId::new());
        let mut last_imported = 0u64;
        let mut last_skipped = 0u64;
        for (imported, skipped) in increments {
            session.accumulate(imported, skipped);
            prop_assert!(session.transactions_imported >= last_imported);
            prop_assert!(session.transactions_skipped >= last_skipped);
            last_imported = session.transactions_imported;
            last_skipped = session.transactions_skipped;
        }
    }

    /// Sink idempotence: saving the same batch twice inserts once, then
    /// skips everything the second time.
    #[test]
    fn repeated_save_batch_is_idempotent(
        batch in raw_record_batch_strategy(SessionId::new())
    ) {
        let mut sink = DedupSink::default();
        let first = sink.save_batch(&batch);
        let second = sink.save_batch(&batch);

        let unique_hashes: HashSet<_> = batch.iter().map(|r| r.content_hash.clone()).collect();
        prop_assert_eq!(first.inserted, unique_hashes.len() as u64);
        prop_assert_eq!(first.skipped, batch.len() as u64 - unique_hashes.len() as u64);
        prop_assert_eq!(second.inserted, 0);
        prop_assert_eq!(second.skipped, batch.len() as u64);
    }

    /// Resume correctness: splitting a batch in two and saving each half
    /// separately (simulating a forced crash between them) inserts exactly
    /// the same set of content hashes as saving the whole batch at once.
    #[test]
    fn crash_and_resume_yields_same_inserted_set(
        batch in raw_record_batch_strategy(SessionId::new()),
        split_at in 0usize..20,
    ) {
        let split_at = split_at.min(batch.len());
        let (front, back) = batch.split_at(split_at);

        let mut resumed_sink = DedupSink::default();
        resumed_sink.save_batch(front);
        resumed_sink.save_batch(back);

        let mut clean_sink = DedupSink::default();
        clean_sink.save_batch(&batch);

        prop_assert_eq!(resumed_sink.seen, clean_sink.seen);
    }

    /// A session's transition table never permits more than one terminal
    /// completion: once completed or failed, further transitions are
    /// rejected, so the account can never carry two concurrently-active
    /// sessions derived from the same handle.
    #[test]
    fn session_cannot_be_revived_after_terminal_transition(
        terminal_is_complete in any::<bool>(),
        trailing_ops in proptest::collection::vec(0u8..3, 0..5),
    ) {
        let mut session = ImportSession::start_new(AccountId::new());
        if terminal_is_complete {
            session.complete().unwrap();
        } else {
            session.fail("synthetic failure").unwrap();
        }

        for op in trailing_ops {
            let result = match op {
                0 => session.resume(),
                1 => session.complete(),
                _ => session.fail("retry"),
            };
            prop_assert!(result.is_err());
        }
    }

    /// `normalizeHash` is idempotent: re-normalizing an already-normalized
    /// base yields the same base.
    #[test]
    fn normalize_hash_is_idempotent(hash in hex_hash_strategy()) {
        let once = normalize_hash(&hash);
        let twice = normalize_hash(&once.base);
        prop_assert_eq!(once.base, twice.base);
    }

    /// Hex hashes compare case-insensitively; non-hex hashes don't.
    #[test]
    fn hex_hashes_are_case_insensitive(hash in hex_hash_strategy()) {
        let upper = normalize_hash(&hash.to_uppercase());
        let lower = normalize_hash(&hash.to_lowercase());
        prop_assert_eq!(upper.base, lower.base);
    }

    #[test]
    fn non_hex_hashes_are_case_sensitive(hash in non_hex_hash_strategy()) {
        let swapped = swap_case(&hash);
        prop_assume!(swapped != hash);
        let a = normalize_hash(&hash);
        let b = normalize_hash(&swapped);
        prop_assert_ne!(a.base, b.base);
    }

    /// Every match the engine proposes has a target no earlier than its
    /// source, and a target amount that never exceeds 101% of the source
    /// (the only relaxation is the hash-confirmed excess bound).
    #[test]
    fn matches_never_invert_timing_or_amount(
        source_amount in money_strategy(),
        target_amount in money_strategy(),
        gap_hours in -72i64..72i64,
        asset in asset_id_strategy(),
        source_timestamp in timestamp_strategy(),
    ) {
        let target_timestamp = source_timestamp + Duration::hours(gap_hours);
        let source = make_transaction(1, SourceKind::ExchangeApi, Direction::Out, asset.clone(), source_amount, source_timestamp, None);
        let target = make_transaction(2, SourceKind::Blockchain, Direction::In, asset, target_amount, target_timestamp, None);

        let engine = MatchingEngine::new(ledger_config::MatchingConfig::default());
        let matches = engine.find_potential_matches(&[source, target]);

        for m in &matches {
            prop_assert!(m.criteria.timing_gap_hours >= 0.0);
            let bound = m.source_amount.multiply_scalar(rust_decimal::Decimal::new(101, 2));
            prop_assert!(m.target_amount.is_less_than_or_equal(bound));
        }
    }

    /// No match between two blockchain-sourced candidates ever carries
    /// `hashMatch = true` — an equal hash there is the same on-chain event,
    /// not a transfer between accounts.
    #[test]
    fn blockchain_to_blockchain_hash_is_never_matched(
        hash in hex_hash_strategy(),
        amount in money_strategy(),
        timestamp in timestamp_strategy(),
        asset in asset_id_strategy(),
    ) {
        let source = candidate(1, SourceKind::Blockchain, Direction::Out, asset.clone(), amount, timestamp, Some(hash.clone()));
        let target = candidate(2, SourceKind::Blockchain, Direction::In, asset, amount, timestamp, Some(hash));
        prop_assert!(find_hash_match(&source, &[target]).is_none());
    }

    /// After deduplication, each target transaction id appears in at most
    /// one returned match.
    #[test]
    fn deduplication_keeps_one_match_per_target(
        confidences in proptest::collection::vec(0.0f64..1.0, 1..10),
        target_count in 1usize..4,
    ) {
        let config = ledger_config::MatchingConfig::default();
        let targets: Vec<TransactionId> = (0..target_count).map(|_| TransactionId::new()).collect();
        let matches: Vec<PotentialMatch> = confidences
            .iter()
            .enumerate()
            .map(|(i, confidence)| synthetic_match(targets[i % targets.len()], *confidence))
            .collect();

        let results = deduplicate_and_confirm(matches, &config);
        let mut seen = HashSet::new();
        for (m, _) in &results {
            prop_assert!(seen.insert(m.target_transaction_id));
        }
    }
}

fn swap_case(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_uppercase() { c.to_ascii_lowercase() } else { c.to_ascii_uppercase() })
        .collect()
}

fn make_transaction(
    id: u128,
    kind: SourceKind,
    direction: Direction,
    asset: domain::AssetId,
    amount: Money,
    timestamp: chrono::DateTime<chrono::Utc>,
    hash: Option<String>,
) -> UniversalTransaction {
    let tx_id = TransactionId::from_uuid(uuid::Uuid::from_u128(id));
    let movement = Movement {
        transaction_id: tx_id,
        source_name: "source".to_string(),
        source_kind: kind,
        asset_id: asset,
        asset_symbol: "SYM".to_string(),
        gross_amount: amount,
        net_amount: None,
        direction,
        timestamp,
        from_address: None,
        to_address: None,
        transaction_hash: hash,
    };
    UniversalTransaction::new(tx_id, "source", kind, timestamp).with_movement(movement)
}

fn candidate(
    id: u128,
    kind: SourceKind,
    direction: Direction,
    asset: domain::AssetId,
    amount: Money,
    timestamp: chrono::DateTime<chrono::Utc>,
    hash: Option<String>,
) -> TransactionCandidate {
    TransactionCandidate {
        originating_transaction_id: TransactionId::from_uuid(uuid::Uuid::from_u128(id)),
        direction,
        asset_id: asset,
        asset_symbol: "SYM".to_string(),
        source_name: "source".to_string(),
        source_kind: kind,
        amount,
        timestamp,
        from_address: None,
        to_address: None,
        transaction_hash: hash,
    }
}

fn synthetic_match(target: TransactionId, confidence: f64) -> PotentialMatch {
    PotentialMatch {
        source_transaction_id: TransactionId::new(),
        target_transaction_id: target,
        source_amount: Money::parse("1.0").unwrap(),
        target_amount: Money::parse("1.0").unwrap(),
        asset_symbol: "BTC".to_string(),
        criteria: MatchCriteria {
            asset_match: true,
            amount_similarity: 1.0,
            timing_valid: true,
            timing_gap_hours: 1.0,
            address_match: TriState::Unknown,
            hash_match: false,
        },
        confidence,
        link_type: LinkType::ExchangeToBlockchain,
    }
}
