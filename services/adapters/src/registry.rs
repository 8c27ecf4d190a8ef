//! Adapter Registry (spec §4.1).
//!
//! A process-wide, read-after-init mapping from lowercased chain/exchange
//! name to a set of factories. Populated once at startup by calling each
//! adapter's registration function in a known order — no reflection, no
//! plugin loading (spec §9 design note).

use std::collections::HashMap;
use std::sync::Arc;

use domain::ChainModel;

use crate::error::{AdapterError, Result};
use crate::importer::Importer;
use crate::processor::Processor;
use crate::provider_manager::ProviderManager;

pub type ImporterFactory =
    Arc<dyn Fn(Arc<ProviderManager>, Option<String>) -> Arc<dyn Importer> + Send + Sync>;
pub type ProcessorFactory = Arc<dyn Fn() -> Arc<dyn Processor> + Send + Sync>;
pub type AddressNormalizer = Arc<dyn Fn(&str) -> std::result::Result<String, String> + Send + Sync>;

/// A blockchain adapter's registration: an importer/processor factory pair,
/// plus the chain-specific address normalization and UTXO/account-based
/// model the matching engine and normalization layer need.
#[derive(Clone)]
pub struct BlockchainEntry {
    pub chain_name: String,
    pub chain_model: ChainModel,
    pub create_importer: ImporterFactory,
    pub create_processor: ProcessorFactory,
    pub normalize_address: AddressNormalizer,
}

impl BlockchainEntry {
    pub fn normalize(&self, address: &str) -> std::result::Result<String, String> {
        (self.normalize_address)(address)
    }
}

/// An exchange adapter's registration (API or CSV): no address
/// normalization, no chain model — exchanges identify accounts by
/// credentials handle or CSV directory list instead.
#[derive(Clone)]
pub struct ExchangeEntry {
    pub exchange_name: String,
    pub create_importer: ImporterFactory,
    pub create_processor: ProcessorFactory,
}

#[derive(Clone)]
pub enum AdapterEntry {
    Blockchain(BlockchainEntry),
    Exchange(ExchangeEntry),
}

/// The registry itself. Lookups are case-insensitive; the registry is
/// read-only after `AdapterRegistry::build` returns.
#[derive(Default)]
pub struct AdapterRegistry {
    blockchains: HashMap<String, BlockchainEntry>,
    exchanges: HashMap<String, ExchangeEntry>,
}

impl AdapterRegistry {
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Case-insensitive lookup. Unknown names are reported to the runner as
    /// a fatal pre-flight error (spec §4.1 contract).
    pub fn get(&self, source_name: &str) -> Result<AdapterEntry> {
        let key = source_name.to_lowercase();
        if let Some(entry) = self.blockchains.get(&key) {
            return Ok(AdapterEntry::Blockchain(entry.clone()));
        }
        if let Some(entry) = self.exchanges.get(&key) {
            return Ok(AdapterEntry::Exchange(entry.clone()));
        }
        Err(AdapterError::UnknownAdapter(source_name.to_string()))
    }

    pub fn get_blockchain(&self, chain_name: &str) -> Result<BlockchainEntry> {
        self.blockchains
            .get(&chain_name.to_lowercase())
            .cloned()
            .ok_or_else(|| AdapterError::UnknownAdapter(chain_name.to_string()))
    }
}

#[derive(Default)]
pub struct AdapterRegistryBuilder {
    blockchains: HashMap<String, BlockchainEntry>,
    exchanges: HashMap<String, ExchangeEntry>,
}

impl AdapterRegistryBuilder {
    pub fn register_blockchain(mut self, entry: BlockchainEntry) -> Self {
        self.blockchains.insert(entry.chain_name.to_lowercase(), entry);
        self
    }

    pub fn register_exchange(mut self, entry: ExchangeEntry) -> Self {
        self.exchanges.insert(entry.exchange_name.to_lowercase(), entry);
        self
    }

    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            blockchains: self.blockchains,
            exchanges: self.exchanges,
        }
    }
}
