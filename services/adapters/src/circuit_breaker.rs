//! Per-provider circuit breaker (spec §4.2 "Circuit breaking").

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::CircuitState;
use events::{EventBus, ImportEvent, Topic};
use ledger_config::CircuitBreakerSettings;
use tokio::sync::RwLock;

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    window_started_at: Instant,
    opened_at: Option<Instant>,
    current_cooldown: Duration,
}

/// Thread-safe circuit breaker for one provider. Guarded by a single
/// `RwLock` rather than lock-free structures — per spec §9 design notes,
/// state here is read and written infrequently relative to the requests it
/// guards, so a short critical section is the right tool.
pub struct CircuitBreaker {
    provider_name: String,
    settings: CircuitBreakerSettings,
    inner: RwLock<Inner>,
    trip_count: AtomicU32,
}

impl CircuitBreaker {
    pub fn new(provider_name: impl Into<String>, settings: CircuitBreakerSettings) -> Self {
        Self {
            provider_name: provider_name.into(),
            settings,
            inner: RwLock::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                window_started_at: Instant::now(),
                opened_at: None,
                current_cooldown: Duration::from_millis(settings.cooldown_ms),
            }),
            trip_count: AtomicU32::new(0),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.read().await.state
    }

    /// Returns whether a call should be attempted right now, transitioning
    /// open -> half-open if the cooldown has elapsed.
    pub async fn should_attempt(&self, events: &dyn EventBus) -> bool {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= inner.current_cooldown {
                    inner.state = CircuitState::HalfOpen;
                    drop(inner);
                    events.publish(
                        ImportEvent::new(Topic::ProviderCircuitHalfOpen)
                            .with_source(self.provider_name.clone()),
                    );
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn on_success(&self, events: &dyn EventBus) {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.current_cooldown = Duration::from_millis(self.settings.cooldown_ms);
                inner.window_started_at = Instant::now();
                drop(inner);
                events.publish(
                    ImportEvent::new(Topic::ProviderCircuitClosed)
                        .with_source(self.provider_name.clone()),
                );
            }
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::Open => {}
        }
    }

    pub async fn on_failure(&self, events: &dyn EventBus) {
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        match inner.state {
            CircuitState::HalfOpen => {
                // Trial call failed: reopen with exponential backoff.
                let doubled = inner.current_cooldown * 2;
                let max_cooldown = Duration::from_millis(self.settings.max_cooldown_ms);
                inner.current_cooldown = doubled.min(max_cooldown);
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                drop(inner);
                self.trip_count.fetch_add(1, Ordering::Relaxed);
                events.publish(
                    ImportEvent::new(Topic::ProviderCircuitOpened)
                        .with_source(self.provider_name.clone()),
                );
            }
            CircuitState::Closed => {
                let window = Duration::from_millis(self.settings.window_ms);
                if now.duration_since(inner.window_started_at) > window {
                    inner.consecutive_failures = 0;
                    inner.window_started_at = now;
                }
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.settings.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    inner.current_cooldown = Duration::from_millis(self.settings.cooldown_ms);
                    drop(inner);
                    self.trip_count.fetch_add(1, Ordering::Relaxed);
                    events.publish(
                        ImportEvent::new(Topic::ProviderCircuitOpened)
                            .with_source(self.provider_name.clone()),
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn trip_count(&self) -> u32 {
        self.trip_count.load(Ordering::Relaxed)
    }
}

/// A registry of circuit breakers keyed by provider name, shared across all
/// import tasks for a given chain (spec §5 "shared-resource policy").
pub struct CircuitBreakerRegistry {
    breakers: RwLock<std::collections::HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self {
            breakers: RwLock::new(std::collections::HashMap::new()),
        }
    }

    pub async fn get_or_insert(
        &self,
        provider_name: &str,
        settings: CircuitBreakerSettings,
    ) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.read().await.get(provider_name) {
            return existing.clone();
        }
        let mut write_guard = self.breakers.write().await;
        write_guard
            .entry(provider_name.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(provider_name, settings)))
            .clone()
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
