//! Real, non-durable repository implementations and a scripted importer
//! fixture, wired against `import-runner` to exercise it end to end without
//! a real database or a real exchange.

pub mod fixtures;
pub mod repositories;

pub use fixtures::KrakenPartialFixtureImporter;
pub use repositories::{InMemoryAccounts, InMemoryRawData, InMemorySessions, InMemoryTransactionLinks};
