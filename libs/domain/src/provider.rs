//! Provider identity and capability vocabulary (spec §3 "Provider", §4.2).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The set of operations a provider may support. Blockchain explorers
/// typically implement a subset; the provider manager routes on this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    GetAddressTransactions,
    GetAddressInternalTransactions,
    GetAddressTokenTransactions,
    GetAddressBalances,
    GetBlockByHeight,
}

/// How a blockchain adapter models accounts: unspent-transaction-output
/// (Bitcoin-like) or account-based (Ethereum-like). Declared once per
/// adapter registration (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainModel {
    Utxo,
    AccountBased,
}

/// Per-provider circuit breaker state (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Identity and static capability set of a provider, independent of its
/// current rate-limit/circuit runtime state (those live in `services/adapters`
/// since they are mutable and process-local).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub chain: String,
    pub priority: u32,
    pub capabilities: HashSet<Operation>,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, chain: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            chain: chain.into(),
            priority,
            capabilities: HashSet::new(),
        }
    }

    pub fn with_capability(mut self, op: Operation) -> Self {
        self.capabilities.insert(op);
        self
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.capabilities.contains(&op)
    }
}
