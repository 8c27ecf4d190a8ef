//! Matching engine configuration surface (spec §6).

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tunable thresholds for the transfer-matching engine. The confidence
/// weights themselves (30/40/20/10/10, spec §4.4.2) are *not* here — per
/// DESIGN.md's resolution of open question O2, they stay as named constants
/// in `matching-engine::scoring`, not in this config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub min_confidence: f64,
    pub auto_confirm_threshold: f64,
    pub min_amount_similarity: f64,
    pub time_window_hours: f64,
    pub close_timing_bonus_hours: f64,
    /// O3: the hash-excess allowance, named rather than a bare literal.
    pub hash_excess_tolerance_pct: f64,
    /// The variance ceiling past which `createTransactionLink` rejects
    /// (spec §4.4.5, S4: "exceeds 10% threshold").
    pub max_variance_pct: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
            auto_confirm_threshold: 0.95,
            min_amount_similarity: 0.95,
            time_window_hours: 48.0,
            close_timing_bonus_hours: 1.0,
            hash_excess_tolerance_pct: 0.01,
            max_variance_pct: 0.10,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: &[(&str, f64)] = &[
            ("min_confidence", self.min_confidence),
            ("auto_confirm_threshold", self.auto_confirm_threshold),
            ("min_amount_similarity", self.min_amount_similarity),
            ("hash_excess_tolerance_pct", self.hash_excess_tolerance_pct),
            ("max_variance_pct", self.max_variance_pct),
        ];
        for (name, value) in checks {
            if !(0.0..=1.0).contains(value) {
                return Err(ConfigError::OutOfRange {
                    field: name.to_string(),
                    value: *value,
                });
            }
        }
        if self.time_window_hours <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "time_window_hours".to_string(),
                value: self.time_window_hours,
            });
        }
        if self.auto_confirm_threshold < self.min_confidence {
            return Err(ConfigError::Inconsistent(
                "auto_confirm_threshold must be >= min_confidence".to_string(),
            ));
        }
        Ok(())
    }
}
