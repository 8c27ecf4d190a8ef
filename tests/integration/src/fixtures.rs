//! A scripted `Importer` standing in for Kraken: yields two successful
//! batches, then a partial failure salvaging some records, then (once
//! re-run with the resulting cursors) only records strictly newer than
//! what was already ingested.

use std::collections::HashMap;

use adapter_core::{Batch, BatchResult, ImportError, ImportParams, Importer, PartialImportError};
use async_trait::async_trait;
use domain::{CursorState, RawRecord, SessionId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct KrakenPartialFixtureImporter;

fn records_for(stream: &str, keys: std::ops::RangeInclusive<u64>) -> Vec<RawRecord> {
    keys.map(|key| {
        RawRecord::new(
            SessionId::new(),
            "kraken",
            format!("kraken:{stream}:{key}"),
            stream,
            serde_json::json!({ "id": key }),
        )
    })
    .collect()
}

fn batch_for(stream: &str, keys: std::ops::RangeInclusive<u64>, total_fetched: u64) -> Batch {
    let last_key = *keys.end();
    Batch::new(records_for(stream, keys), stream, CursorState::new(serde_json::json!(last_key), total_fetched))
}

fn cursor_key(params: &ImportParams, stream: &str) -> u64 {
    params.cursor.get(stream).and_then(|c| c.primary_key.as_u64()).unwrap_or(0)
}

#[async_trait]
impl Importer for KrakenPartialFixtureImporter {
    async fn import_streaming(&self, params: ImportParams, _cancellation: CancellationToken) -> mpsc::Receiver<BatchResult> {
        let (tx, rx) = mpsc::channel(4);

        let trade_cursor = cursor_key(&params, "trade");
        let deposit_cursor = cursor_key(&params, "deposit");

        tokio::spawn(async move {
            if trade_cursor == 0 && deposit_cursor == 0 {
                let _ = tx.send(Ok(batch_for("trade", 1..=100, 100))).await;
                let _ = tx.send(Ok(batch_for("deposit", 1..=50, 50))).await;

                let mut cursor_updates = HashMap::new();
                cursor_updates.insert("trade".to_string(), CursorState::new(serde_json::json!(125u64), 125));
                cursor_updates.insert("deposit".to_string(), CursorState::new(serde_json::json!(50u64), 50));

                let partial = PartialImportError {
                    successful_records: records_for("trade", 101..=125),
                    failing_item: serde_json::json!({ "id": 126, "reason": "malformed trade record" }),
                    last_good_cursor_updates: cursor_updates,
                    message: "kraken returned a malformed trade record at id 126".to_string(),
                };
                let _ = tx.send(Err(ImportError::Partial(partial))).await;
            } else {
                let fresh_start = trade_cursor + 1;
                let fresh_end = trade_cursor + 10;
                let _ = tx
                    .send(Ok(batch_for("trade", fresh_start..=fresh_end, trade_cursor + 10).complete()))
                    .await;
            }
        });

        rx
    }
}
