//! Streaming Import Runner (spec §4.3).
//!
//! Drives one adapter's batch iterator to completion against the
//! repository contracts, enforcing the ordered per-batch steps and the
//! cursor-commit-after-sink-ack rule the whole resume story depends on.

use std::sync::Arc;

use adapter_core::{AdapterEntry, AdapterRegistry, ImportError, ImportParams, ProviderManager};
use domain::{Account, AccountId, AccountKind, ImportSession};
use events::{EventBus, ImportEvent, Topic};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Result, RunnerError};
use crate::repository::{AccountRepository, ImportSessionRepository, RawDataRepository};

pub struct ImportRunner {
    registry: Arc<AdapterRegistry>,
    provider_manager: Arc<ProviderManager>,
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn ImportSessionRepository>,
    raw_data: Arc<dyn RawDataRepository>,
    events: Arc<dyn EventBus>,
}

impl ImportRunner {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        provider_manager: Arc<ProviderManager>,
        accounts: Arc<dyn AccountRepository>,
        sessions: Arc<dyn ImportSessionRepository>,
        raw_data: Arc<dyn RawDataRepository>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            registry,
            provider_manager,
            accounts,
            sessions,
            raw_data,
            events,
        }
    }

    /// `importFromSource(account) -> Result<ImportSession, Error>` (spec §4.3).
    pub async fn import_from_source(&self, account_id: AccountId, cancellation: CancellationToken) -> Result<ImportSession> {
        let mut account = self.accounts.find_by_id(account_id).await?;

        // Pre-flight: registry lookup, then (for blockchains) address normalization.
        let entry = self.registry.get(&account.source_name)?;
        if let AdapterEntry::Blockchain(blockchain) = &entry {
            let canonical = blockchain
                .normalize(&account.identifier)
                .map_err(adapter_core::AdapterError::InvalidAccountInput)?;
            account.identifier = canonical;
        }
        let preferred_provider = account.preferred_provider.clone();

        let mut session = match self.sessions.find_latest_incomplete(account_id).await? {
            Some(mut existing) => {
                existing.resume().map_err(|e| RunnerError::ImportFailed {
                    session_id: existing.id.to_string(),
                    message: e.to_string(),
                })?;
                self.sessions.update(existing).await?
            }
            None => {
                let created = ImportSession::start_new(account_id);
                self.sessions.create(created).await?
            }
        };

        self.events.publish(
            ImportEvent::new(Topic::ImportSessionStarted)
                .with_session(session.id)
                .with_account(account_id)
                .with_source(account.source_name.clone()),
        );

        match self.run_batch_loop(&entry, &account, &mut session, preferred_provider, cancellation).await {
            Ok(()) => {
                session.complete().map_err(|e| RunnerError::ImportFailed {
                    session_id: session.id.to_string(),
                    message: e.to_string(),
                })?;
                let finalized = self.sessions.finalize(session).await?;
                self.events.publish(
                    ImportEvent::new(Topic::ImportSessionCompleted)
                        .with_session(finalized.id)
                        .with_account(account_id)
                        .with_count("imported", finalized.transactions_imported)
                        .with_count("skipped", finalized.transactions_skipped),
                );
                Ok(finalized)
            }
            Err(err) => {
                let message = err.to_string();
                // Best-effort fail transition; an already-terminal session
                // (e.g. a partial-import path that finalized itself) is left alone.
                let _ = session.fail(message.clone());
                let finalized = self.sessions.finalize(session).await?;
                self.events.publish(
                    ImportEvent::new(Topic::ImportSessionFailed)
                        .with_session(finalized.id)
                        .with_account(account_id)
                        .with_metadata(serde_json::json!({ "error": message })),
                );
                Err(err)
            }
        }
    }

    async fn run_batch_loop(
        &self,
        entry: &AdapterEntry,
        account: &Account,
        session: &mut ImportSession,
        preferred_provider: Option<String>,
        cancellation: CancellationToken,
    ) -> Result<()> {
        let importer = match entry {
            AdapterEntry::Blockchain(b) => (b.create_importer)(self.provider_manager.clone(), preferred_provider),
            AdapterEntry::Exchange(e) => (e.create_importer)(self.provider_manager.clone(), preferred_provider),
        };

        let params = ImportParams {
            address: matches!(account.kind, AccountKind::Blockchain).then(|| account.identifier.clone()),
            credentials: matches!(account.kind, AccountKind::ExchangeApi).then(|| serde_json::json!(account.identifier)),
            csv_directories: matches!(account.kind, AccountKind::ExchangeCsv)
                .then(|| account.identifier.split(',').map(str::to_string).collect()),
            cursor: account.last_cursor.clone(),
            provider_name: account.preferred_provider.clone(),
        };

        let mut receiver = importer.import_streaming(params, cancellation.clone()).await;

        loop {
            if cancellation.is_cancelled() {
                return Err(RunnerError::Cancelled {
                    session_id: session.id.to_string(),
                });
            }

            let batch = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    return Err(RunnerError::Cancelled { session_id: session.id.to_string() });
                }
                item = receiver.recv() => item,
            };

            let batch = match batch {
                Some(Ok(batch)) => batch,
                Some(Err(ImportError::Adapter(message))) => {
                    return Err(RunnerError::ImportFailed {
                        session_id: session.id.to_string(),
                        message,
                    });
                }
                Some(Err(ImportError::Partial(partial))) => {
                    return self.handle_partial_import(session, account.id, partial).await;
                }
                None => break, // iterator exhausted: finalize as completed.
            };

            if !batch.warnings.is_empty() {
                // Literal source policy (spec §9 O1): any non-empty warnings
                // hard-fail the batch rather than being silently processed.
                session.metadata = serde_json::json!({ "warnings": batch.warnings });
                return Err(RunnerError::WarningsEmitted {
                    session_id: session.id.to_string(),
                    warning_count: batch.warnings.len(),
                });
            }

            let save_result = self
                .raw_data
                .save_batch(session.id, batch.raw_transactions)
                .await
                .map_err(|source| RunnerError::SinkWriteFailed {
                    session_id: session.id.to_string(),
                    source,
                })?;

            self.accounts
                .update_cursor(account.id, &batch.stream_type, batch.cursor.clone())
                .await
                .map_err(|source| RunnerError::CursorCommitFailed {
                    session_id: session.id.to_string(),
                    source,
                })?;
            for (stream_type, cursor) in &batch.cursor_updates {
                self.accounts
                    .update_cursor(account.id, stream_type, cursor.clone())
                    .await
                    .map_err(|source| RunnerError::CursorCommitFailed {
                        session_id: session.id.to_string(),
                        source,
                    })?;
            }

            session.accumulate(save_result.inserted, save_result.skipped);

            self.events.publish(
                ImportEvent::new(Topic::ImportBatchSaved)
                    .with_session(session.id)
                    .with_account(account.id)
                    .with_source(batch.stream_type.clone())
                    .with_count("inserted", save_result.inserted)
                    .with_count("skipped", save_result.skipped)
                    .with_count("total_fetched", batch.cursor.total_fetched),
            );

            if batch.is_complete {
                info!(session_id = %session.id, stream_type = %batch.stream_type, "stream reported complete");
            }
        }

        Ok(())
    }

    /// Partial-failure path (spec §4.3): salvage validated records and
    /// cursor updates, finalize failed, surface an actionable error.
    async fn handle_partial_import(
        &self,
        session: &mut ImportSession,
        account_id: AccountId,
        partial: adapter_core::PartialImportError,
    ) -> Result<()> {
        let save_result = self
            .raw_data
            .save_batch(session.id, partial.successful_records)
            .await
            .map_err(|source| RunnerError::SinkWriteFailed {
                session_id: session.id.to_string(),
                source,
            })?;
        session.accumulate(save_result.inserted, save_result.skipped);

        for (stream_type, cursor) in &partial.last_good_cursor_updates {
            self.accounts
                .update_cursor(account_id, stream_type, cursor.clone())
                .await
                .map_err(|source| RunnerError::CursorCommitFailed {
                    session_id: session.id.to_string(),
                    source,
                })?;
        }

        session.metadata = serde_json::json!({ "partial_import_failing_item": partial.failing_item });
        warn!(session_id = %session.id, message = %partial.message, "partial import: salvaged records, failing session");

        Err(RunnerError::PartialImport {
            session_id: session.id.to_string(),
            message: partial.message,
        })
    }
}
