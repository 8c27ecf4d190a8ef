//! Reusable `proptest` strategies for monetary amounts, addresses,
//! transaction hashes, and synthetic raw-record batches, shared by the
//! property suites under `tests/`.

use chrono::{DateTime, TimeZone, Utc};
use domain::{AssetId, Money, ProcessingStatus, RawRecord, SessionId};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// A `Money` value with up to 8 decimal places, bounded to a realistic
/// transfer range (never zero, never absurdly large).
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (1i64..1_000_000_000i64, 0u32..=8u32).prop_map(|(mantissa, scale)| {
        Money::from_decimal(Decimal::new(mantissa, scale))
    })
}

/// An arbitrary timestamp within a multi-year window, used to generate
/// source/target pairs with varied timing gaps.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (2020i32..2026i32, 1u32..=12u32, 1u32..=28u32, 0u32..24u32, 0u32..60u32).prop_map(
        |(year, month, day, hour, minute)| Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap(),
    )
}

/// A hex transaction hash, with or without an EVM-style log-index suffix,
/// in a mix of cases (to exercise case-insensitive comparison).
pub fn hex_hash_strategy() -> impl Strategy<Value = String> {
    (
        "[0-9a-fA-F]{8,64}",
        proptest::option::of(0u64..1000),
    )
        .prop_map(|(body, suffix)| match suffix {
            Some(idx) => format!("0x{body}-{idx}"),
            None => format!("0x{body}"),
        })
}

/// A non-hex hash (base58-style, as Solana signatures look), case-sensitive
/// by normalization rule.
pub fn non_hex_hash_strategy() -> impl Strategy<Value = String> {
    "[1-9A-HJ-NP-Za-km-z]{20,60}"
}

/// An on-chain-looking address, for `TransactionCandidate::from_address`/`to_address`.
pub fn address_strategy() -> impl Strategy<Value = String> {
    "0x[0-9a-f]{40}"
}

pub fn asset_id_strategy() -> impl Strategy<Value = AssetId> {
    prop_oneof![
        Just(AssetId::blockchain("bitcoin", "btc")),
        Just(AssetId::blockchain("ethereum", "eth")),
        Just(AssetId::exchange("kraken", "btc")),
    ]
}

/// A synthetic, internally-consistent `RawRecord` for one session: a random
/// content hash keeps duplicates distinguishable unless the test explicitly
/// repeats one.
pub fn raw_record_strategy(session_id: SessionId) -> impl Strategy<Value = RawRecord> {
    ("[a-f0-9]{16,32}", "trade|deposit|withdrawal|normal").prop_map(move |(hash, stream)| RawRecord {
        session_id,
        source_name: "kraken".to_string(),
        content_hash: hash,
        stream_type: stream.to_string(),
        payload: serde_json::json!({}),
        status: ProcessingStatus::Pending,
    })
}

/// A batch of raw records for one session, with between 1 and 20 entries
/// and an explicit duplicate rate so idempotence tests see repeats.
pub fn raw_record_batch_strategy(session_id: SessionId) -> impl Strategy<Value = Vec<RawRecord>> {
    proptest::collection::vec(raw_record_strategy(session_id), 1..20)
}
