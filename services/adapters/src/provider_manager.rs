//! Multi-provider failover manager (spec §4.2).
//!
//! One `ProviderManager` per chain-serving process. Holds every registered
//! provider plus its rate limiter and circuit breaker, and exposes a single
//! `execute` entry point that routes by capability, priority, and recent
//! success rate, retrying across providers on transient failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use domain::Operation;
use events::{EventBus, ImportEvent, Topic};
use ledger_config::{CircuitBreakerSettings, ProviderManagerConfig, ProviderSettings};
use serde_json::Value;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreakerRegistry;
use crate::error::{AdapterError, Result};
use crate::provider::Provider;
use crate::rate_limit::RateLimiter;

/// Rolling success/failure counters used to break priority ties (spec §4.2
/// "providers of equal priority are ordered by recent success rate").
#[derive(Default)]
struct HealthCounters {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl HealthCounters {
    fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A Laplace-smoothed success rate so a brand-new provider with zero
    /// history doesn't outrank one with a long, mostly-successful record.
    fn success_rate(&self) -> f64 {
        let s = self.successes.load(Ordering::Relaxed) as f64;
        let f = self.failures.load(Ordering::Relaxed) as f64;
        (s + 1.0) / (s + f + 2.0)
    }
}

struct Registration {
    provider: Arc<dyn Provider>,
    priority: u32,
    health: HealthCounters,
}

/// The outcome of a successful `execute` call: the decoded payload plus the
/// name of the provider that actually produced it, for diagnostics and
/// event publication.
#[derive(Debug, Clone)]
pub struct FailoverExecutionResult<T> {
    pub data: T,
    pub provider: String,
}

pub struct ProviderManager {
    chains: HashMap<String, Vec<Registration>>,
    rate_limiter: RateLimiter,
    circuit_breakers: CircuitBreakerRegistry,
    breaker_settings: HashMap<String, CircuitBreakerSettings>,
    events: Arc<dyn EventBus>,
}

impl ProviderManager {
    pub fn builder(config: &ProviderManagerConfig, events: Arc<dyn EventBus>) -> ProviderManagerBuilder {
        ProviderManagerBuilder {
            config: config.clone(),
            rate_limiter: RateLimiter::new(),
            breaker_settings: HashMap::new(),
            chains: HashMap::new(),
            events,
        }
    }

    /// Route and execute `operation` for `chain`, trying candidates in
    /// priority/health order and failing over on transient errors (spec
    /// §4.2 "Retry & failover").
    pub async fn execute(
        &self,
        chain: &str,
        operation: Operation,
        args: Value,
    ) -> Result<FailoverExecutionResult<Value>> {
        let registrations = self
            .chains
            .get(chain)
            .ok_or_else(|| AdapterError::NoCapableProvider {
                chain: chain.to_string(),
                operation: format!("{operation:?}"),
            })?;

        let mut candidates: Vec<&Registration> = registrations
            .iter()
            .filter(|r| r.provider.supports(operation))
            .collect();

        if candidates.is_empty() {
            return Err(AdapterError::NoCapableProvider {
                chain: chain.to_string(),
                operation: format!("{operation:?}"),
            });
        }

        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.health.success_rate().partial_cmp(&a.health.success_rate()).unwrap())
        });

        let mut attempts: Vec<(String, String)> = Vec::new();

        for registration in candidates {
            let provider_name = registration.provider.name().to_string();
            let breaker = self
                .circuit_breakers
                .get_or_insert(
                    &provider_name,
                    self.breaker_settings
                        .get(&provider_name)
                        .copied()
                        .unwrap_or_default(),
                )
                .await;

            if !breaker.should_attempt(self.events.as_ref()).await {
                attempts.push((provider_name.clone(), "circuit open".to_string()));
                continue;
            }

            self.rate_limiter.wait(&provider_name).await;

            match registration.provider.execute(operation, args.clone()).await {
                Ok(data) => {
                    breaker.on_success(self.events.as_ref()).await;
                    registration.health.record_success();
                    return Ok(FailoverExecutionResult {
                        data,
                        provider: provider_name,
                    });
                }
                Err(err) if err.is_transient() => {
                    debug!(provider = %provider_name, error = %err, "transient provider failure, failing over");
                    breaker.on_failure(self.events.as_ref()).await;
                    registration.health.record_failure();
                    attempts.push((provider_name, err.to_string()));
                }
                Err(err) => {
                    warn!(provider = %provider_name, error = %err, "non-retryable provider failure");
                    registration.health.record_failure();
                    return Err(err);
                }
            }
        }

        Err(AdapterError::ProvidersExhausted {
            chain: chain.to_string(),
            operation: format!("{operation:?}"),
            attempts,
        })
    }
}

pub struct ProviderManagerBuilder {
    config: ProviderManagerConfig,
    rate_limiter: RateLimiter,
    breaker_settings: HashMap<String, CircuitBreakerSettings>,
    chains: HashMap<String, Vec<Registration>>,
    events: Arc<dyn EventBus>,
}

impl ProviderManagerBuilder {
    /// Register a concrete provider for `chain`, applying whatever
    /// `ProviderSettings` the loaded config carries for its name (falling
    /// back to a conservative default if the operator didn't configure it).
    pub fn register(mut self, chain: &str, provider: Arc<dyn Provider>) -> Self {
        let name = provider.name().to_string();
        let settings = self
            .config
            .chains
            .get(chain)
            .and_then(|providers| providers.get(&name))
            .cloned()
            .unwrap_or_else(|| ProviderSettings::new(u32::MAX, 1.0));

        self.rate_limiter.configure_provider(&name, &settings);
        self.breaker_settings.insert(name, settings.circuit);

        self.chains.entry(chain.to_string()).or_default().push(Registration {
            priority: settings.priority,
            provider,
            health: HealthCounters::default(),
        });
        self
    }

    pub fn build(self) -> ProviderManager {
        ProviderManager {
            chains: self.chains,
            rate_limiter: self.rate_limiter,
            circuit_breakers: CircuitBreakerRegistry::new(),
            breaker_settings: self.breaker_settings,
            events: self.events,
        }
    }
}

/// Publish a provider-call-completed event; split out so callers (the
/// import runner) can observe outcomes without the manager depending on
/// runner-side types.
pub fn emit_completion(events: &dyn EventBus, provider: &str, succeeded: bool) {
    let topic = if succeeded { Topic::ProviderCall } else { Topic::ProviderFailover };
    events.publish(ImportEvent::new(topic).with_source(provider.to_string()));
}
