//! End-to-end scenario tests (spec §8). S1, S2, S4, S5 exercise
//! `matching-engine` directly; S6 drives the full `ImportRunner` against
//! the in-memory repositories and the scripted Kraken fixture.

use std::sync::Arc;

use adapter_core::{AdapterRegistry, ExchangeEntry, ProviderManager};
use chrono::{Duration, TimeZone, Utc};
use domain::{Account, AccountKind, Direction, LinkStatus, Money, Movement, SourceKind, TransactionId, UniversalTransaction};
use events::NullEventBus;
use import_runner::ImportRunner;
use integration_fixtures::{InMemoryAccounts, InMemoryRawData, InMemorySessions, InMemoryTransactionLinks, KrakenPartialFixtureImporter};
use ledger_config::{MatchingConfig, ProviderManagerConfig};
use matching_engine::MatchingEngine;
use tokio_util::sync::CancellationToken;

fn transaction(
    id: u128,
    source: &str,
    kind: SourceKind,
    direction: Direction,
    asset: &str,
    amount: &str,
    timestamp: chrono::DateTime<Utc>,
    hash: Option<&str>,
) -> UniversalTransaction {
    let tx_id = TransactionId::from_uuid(uuid::Uuid::from_u128(id));
    let movement = Movement {
        transaction_id: tx_id,
        source_name: source.to_string(),
        source_kind: kind,
        asset_id: domain::AssetId::blockchain("bitcoin", asset),
        asset_symbol: asset.to_uppercase(),
        gross_amount: Money::parse(amount).unwrap(),
        net_amount: None,
        direction,
        timestamp,
        from_address: None,
        to_address: None,
        transaction_hash: hash.map(str::to_string),
    };
    UniversalTransaction::new(tx_id, source, kind, timestamp).with_movement(movement)
}

#[test]
fn s1_exchange_to_blockchain_auto_confirmation() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let source = transaction(1, "kraken", SourceKind::ExchangeApi, Direction::Out, "btc", "1.0", start, None);
    let target = transaction(2, "bitcoin", SourceKind::Blockchain, Direction::In, "btc", "0.9995", start + Duration::hours(1), None);

    let engine = MatchingEngine::new(MatchingConfig::default());
    let matches = engine.find_potential_matches(&[source, target]);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].confidence >= 0.95);
    assert_eq!(matches[0].link_type, domain::LinkType::ExchangeToBlockchain);

    let links = engine.build_links(matches);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].status, LinkStatus::Confirmed);
    assert_eq!(links[0].variance.variance, Money::parse("0.0005").unwrap());
    assert_eq!(links[0].variance.variance_pct, Money::parse("0.05").unwrap());
    assert_eq!(links[0].variance.implied_fee, Money::parse("0.0005").unwrap());
}

#[test]
fn s2_hash_match_trumps_imperfect_amount() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let source = transaction(1, "kraken", SourceKind::ExchangeApi, Direction::Out, "btc", "1.0", start, Some("0xabc123"));
    let hash_target = transaction(
        2,
        "bitcoin",
        SourceKind::Blockchain,
        Direction::In,
        "btc",
        "0.95",
        start + Duration::minutes(10),
        Some("0xabc123"),
    );
    let exact_amount_target = transaction(
        3,
        "bitcoin",
        SourceKind::Blockchain,
        Direction::In,
        "btc",
        "1.00",
        start + Duration::hours(2),
        None,
    );

    let engine = MatchingEngine::new(MatchingConfig::default());
    let matches = engine.find_potential_matches(&[source, hash_target, exact_amount_target]);

    let best = matches.iter().max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap()).unwrap();
    assert_eq!(best.confidence, 1.0);
    assert_eq!(best.target_transaction_id, TransactionId::from_uuid(uuid::Uuid::from_u128(2)));

    let exact_match = matches
        .iter()
        .find(|m| m.target_transaction_id == TransactionId::from_uuid(uuid::Uuid::from_u128(3)))
        .unwrap();
    assert!(exact_match.confidence < best.confidence);
}

#[test]
fn s3_rejection_by_timing() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
    let source = transaction(1, "kraken", SourceKind::ExchangeApi, Direction::Out, "btc", "1.0", start, None);
    let target = transaction(2, "bitcoin", SourceKind::Blockchain, Direction::In, "btc", "1.0", start - Duration::hours(2), None);

    let engine = MatchingEngine::new(MatchingConfig::default());
    assert!(engine.find_potential_matches(&[source, target]).is_empty());
}

#[test]
fn s4_excessive_variance_rejection() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let source = transaction(1, "kraken", SourceKind::ExchangeApi, Direction::Out, "eth", "1.0", start, None);
    let target = transaction(2, "coinbase", SourceKind::ExchangeApi, Direction::In, "eth", "0.85", start + Duration::hours(1), None);

    let engine = MatchingEngine::new(MatchingConfig::default());
    let matches = engine.find_potential_matches(&[source, target]);
    assert_eq!(matches.len(), 1);

    let err = engine
        .create_transaction_link(&matches[0], LinkStatus::Confirmed, "auto")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("exceeds 10% threshold"));
    assert!(message.contains("15.00%"));
}

#[test]
fn s5_hash_ambiguity_falls_back_to_heuristic_scoring() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let source = transaction(1, "kraken", SourceKind::ExchangeApi, Direction::Out, "btc", "1.0", start, Some("0xabc123"));
    let t1 = transaction(
        2,
        "bitcoin",
        SourceKind::Blockchain,
        Direction::In,
        "btc",
        "0.5",
        start + Duration::minutes(5),
        Some("0xabc123-819"),
    );
    let t2 = transaction(
        3,
        "bitcoin",
        SourceKind::Blockchain,
        Direction::In,
        "btc",
        "0.5",
        start + Duration::minutes(6),
        Some("0xabc123-820"),
    );

    let engine = MatchingEngine::new(MatchingConfig::default());
    let matches = engine.find_potential_matches(&[source, t1, t2]);
    assert!(!matches.is_empty());
    assert!(matches.iter().all(|m| m.confidence < 1.0));
}

#[tokio::test]
async fn s6_partial_import_resume() {
    let account = Account::new(AccountKind::ExchangeApi, "kraken", "api-key-handle");
    let account_id = account.id;

    let sessions = Arc::new(InMemorySessions::default());
    let raw_data = Arc::new(InMemoryRawData::new(sessions.clone()));
    let accounts = Arc::new(InMemoryAccounts::new(vec![account]));
    let links = Arc::new(InMemoryTransactionLinks::default());

    let registry = Arc::new(
        AdapterRegistry::builder()
            .register_exchange(ExchangeEntry {
                exchange_name: "kraken".to_string(),
                create_importer: Arc::new(|_pm, _preferred| Arc::new(KrakenPartialFixtureImporter)),
                create_processor: Arc::new(|| Arc::new(NoopProcessor)),
            })
            .build(),
    );
    let provider_manager = Arc::new(ProviderManager::builder(&ProviderManagerConfig::default(), Arc::new(NullEventBus)).build());

    let runner = ImportRunner::new(registry, provider_manager, accounts.clone(), sessions.clone(), raw_data.clone(), Arc::new(NullEventBus));

    let first_run = runner.import_from_source(account_id, CancellationToken::new()).await;
    assert!(first_run.is_err());

    assert_eq!(raw_data.total_for(account_id), 175);

    let resumed_account = accounts.snapshot(account_id);
    assert_eq!(resumed_account.last_cursor.get("trade").unwrap().total_fetched, 125);
    assert_eq!(resumed_account.last_cursor.get("deposit").unwrap().total_fetched, 50);

    let second_run = runner.import_from_source(account_id, CancellationToken::new()).await;
    assert!(second_run.is_ok());

    // The resumed run only fetched 10 fresh trade records (keys 126..135);
    // the sink's content-hash idempotence means none of the first run's
    // 175 records could have been double-counted even if it had re-sent them.
    assert_eq!(raw_data.total_for(account_id), 185);

    let final_account = accounts.snapshot(account_id);
    assert_eq!(final_account.last_cursor.get("trade").unwrap().total_fetched, 135);

    let _ = links.all();
}

struct NoopProcessor;
impl adapter_core::Processor for NoopProcessor {
    fn process(&self, _raw_records: &[domain::RawRecord], _session_metadata: &serde_json::Value) -> Result<Vec<UniversalTransaction>, String> {
        Ok(Vec::new())
    }
}
