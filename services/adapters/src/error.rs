//! Error types for the adapter registry and provider manager (spec §4.2, §7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// The failure taxonomy exposed to the runner (spec §4.2 "Failure taxonomy").
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    /// No registry entry for the requested chain/exchange name.
    #[error("unknown adapter: {0}")]
    UnknownAdapter(String),

    /// No provider is registered for (chain, operation).
    #[error("no provider capable of {operation:?} for chain {chain}")]
    NoCapableProvider { chain: String, operation: String },

    /// A provider's rate limit was hit and the call was not willing to wait.
    #[error("rate limited by provider {provider}")]
    RateLimited { provider: String },

    /// The provider's circuit is open; the call was refused immediately.
    #[error("circuit open for provider {provider}")]
    ProviderCircuitOpen { provider: String },

    /// A transient failure (timeout, 5xx, rate-limit-exceeded) — the caller
    /// may fail over to the next candidate.
    #[error("transient failure from provider {provider}: {message}")]
    ProviderTransient { provider: String, message: String },

    /// A non-transient failure (401, resource-404) — bubbled immediately,
    /// no failover attempted.
    #[error("non-retryable failure from provider {provider}: {message}")]
    ProviderNonRetryable { provider: String, message: String },

    /// All candidates were tried or circuit-opened within one logical call.
    #[error("all providers exhausted for chain {chain}, operation {operation:?}: {attempts:?}")]
    ProvidersExhausted {
        chain: String,
        operation: String,
        attempts: Vec<(String, String)>,
    },

    /// Address normalization rejected the account's identifier.
    #[error("invalid account input: {0}")]
    InvalidAccountInput(String),
}

impl AdapterError {
    /// Whether this error class should trigger failover to the next
    /// candidate provider, per spec §4.2 "Retry & failover".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdapterError::ProviderTransient { .. }
                | AdapterError::RateLimited { .. }
                | AdapterError::ProviderCircuitOpen { .. }
        )
    }
}
