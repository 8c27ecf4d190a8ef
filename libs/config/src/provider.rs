//! Provider manager configuration surface (spec §4.2, §6).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub window_ms: u64,
    pub cooldown_ms: u64,
    pub max_cooldown_ms: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            window_ms: 60_000,
            cooldown_ms: 30_000,
            max_cooldown_ms: 300_000,
        }
    }
}

/// Per-provider settings: rate limit plus an (optionally overridden)
/// circuit breaker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub priority: u32,
    pub requests_per_second: f64,
    pub burst_limit: Option<u32>,
    pub requests_per_minute: Option<u32>,
    #[serde(default)]
    pub circuit: CircuitBreakerSettings,
}

impl ProviderSettings {
    pub fn new(priority: u32, requests_per_second: f64) -> Self {
        Self {
            priority,
            requests_per_second,
            burst_limit: None,
            requests_per_minute: None,
            circuit: CircuitBreakerSettings::default(),
        }
    }

    /// Burst capacity, defaulting to `ceil(requests_per_second)` per spec §4.2.
    pub fn effective_burst_limit(&self) -> u32 {
        self.burst_limit
            .unwrap_or_else(|| self.requests_per_second.ceil() as u32)
    }

    pub fn validate(&self, provider_name: &str) -> Result<(), ConfigError> {
        if self.requests_per_second <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: format!("provider[{provider_name}].requests_per_second"),
                value: self.requests_per_second,
            });
        }
        if self.circuit.failure_threshold == 0 {
            return Err(ConfigError::Inconsistent(format!(
                "provider[{provider_name}].circuit.failure_threshold must be > 0"
            )));
        }
        if self.circuit.max_cooldown_ms < self.circuit.cooldown_ms {
            return Err(ConfigError::Inconsistent(format!(
                "provider[{provider_name}].circuit.max_cooldown_ms must be >= cooldown_ms"
            )));
        }
        Ok(())
    }
}

/// All provider settings, keyed by provider name, grouped under the chain
/// they serve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderManagerConfig {
    /// chain name -> provider name -> settings.
    pub chains: HashMap<String, HashMap<String, ProviderSettings>>,
}

impl ProviderManagerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (chain, providers) in &self.chains {
            if providers.is_empty() {
                return Err(ConfigError::Inconsistent(format!(
                    "chain '{chain}' has no providers configured"
                )));
            }
            for (name, settings) in providers {
                settings.validate(name)?;
            }
        }
        Ok(())
    }
}
