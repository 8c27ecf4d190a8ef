//! Per-provider rate limiting (spec §4.2 "Rate limiting").
//!
//! Each provider gets a token bucket refilling at `requests_per_second`,
//! capacity `burst_limit` (default `ceil(requests_per_second)`). When a
//! `requests_per_minute` ceiling is also configured, a second, coarser
//! bucket (backed by `governor`, which is integer-rate) must grant before
//! the call proceeds.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::{DefaultDirectRateLimiter, Quota};
use ledger_config::ProviderSettings;
use tokio::sync::Mutex;

/// A fractional-rate token bucket. `governor`'s integer-quota limiter can't
/// express a sub-1req/s rate cleanly, so the primary per-second bucket is
/// hand-rolled; the coarser per-minute ceiling (always an integer count in
/// practice) delegates to `governor`.
struct TokenBucketState {
    tokens: f64,
    last_refill: Instant,
}

pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<TokenBucketState>,
}

impl TokenBucket {
    pub fn new(refill_per_sec: f64, capacity: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
            state: Mutex::new(TokenBucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Block (cooperatively) until a token is available, then consume it.
    pub async fn take(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - state.tokens;
                    Some(Duration::from_secs_f64(deficit / self.refill_per_sec))
                }
            };
            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }

    /// Non-blocking check: would a token be available right now?
    pub async fn check(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;
        state.tokens >= 1.0
    }
}

struct ProviderLimiter {
    per_second: Arc<TokenBucket>,
    per_minute: Option<Arc<DefaultDirectRateLimiter>>,
}

/// Rate limiter holding one (or two) buckets per provider name.
#[derive(Default)]
pub struct RateLimiter {
    limiters: HashMap<String, ProviderLimiter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure_provider(&mut self, provider_name: &str, settings: &ProviderSettings) {
        let per_second = Arc::new(TokenBucket::new(
            settings.requests_per_second,
            settings.effective_burst_limit() as f64,
        ));
        let per_minute = settings.requests_per_minute.and_then(|rpm| {
            NonZeroU32::new(rpm).map(|rate| Arc::new(DefaultDirectRateLimiter::direct(Quota::per_minute(rate))))
        });
        self.limiters.insert(
            provider_name.to_string(),
            ProviderLimiter {
                per_second,
                per_minute,
            },
        );
    }

    /// Cooperatively wait until both configured buckets grant for `provider`.
    /// A provider with no configured limiter is always allowed through.
    pub async fn wait(&self, provider: &str) {
        if let Some(limiter) = self.limiters.get(provider) {
            limiter.per_second.take().await;
            if let Some(per_minute) = &limiter.per_minute {
                per_minute.until_ready().await;
            }
        }
    }

    /// Non-blocking check, used to short-circuit before queueing work.
    pub async fn check(&self, provider: &str) -> bool {
        match self.limiters.get(provider) {
            Some(limiter) => {
                let second_ok = limiter.per_second.check().await;
                let minute_ok = limiter
                    .per_minute
                    .as_ref()
                    .map(|l| l.check().is_ok())
                    .unwrap_or(true);
                second_ok && minute_ok
            }
            None => true,
        }
    }
}
