//! Adapter registry, importer/processor/provider contracts, and the
//! multi-provider failover manager (spec §4.1, §4.2, §6).

pub mod circuit_breaker;
pub mod error;
pub mod importer;
pub mod processor;
pub mod provider;
pub mod provider_manager;
pub mod rate_limit;
pub mod registry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerRegistry};
pub use error::{AdapterError, Result};
pub use importer::{Batch, BatchResult, ImportError, ImportParams, Importer, PartialImportError};
pub use processor::Processor;
pub use provider::Provider;
pub use provider_manager::{FailoverExecutionResult, ProviderManager, ProviderManagerBuilder};
pub use rate_limit::RateLimiter;
pub use registry::{AdapterEntry, AdapterRegistry, BlockchainEntry, ExchangeEntry};
