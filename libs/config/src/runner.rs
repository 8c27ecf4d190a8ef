//! Streaming import runner configuration surface (spec §6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub batch_save_timeout_ms: u64,
    pub cancellation_grace_period_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_save_timeout_ms: 30_000,
            cancellation_grace_period_ms: 5_000,
        }
    }
}
