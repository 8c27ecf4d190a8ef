//! Typed, environment-overridable configuration for the ledger ingestion and
//! matching pipeline.
//!
//! Each section (matching, provider manager, runner) is a plain struct with
//! `serde` defaults, matching the reference workspace's convention of
//! loading a TOML file and then letting environment variables override
//! individual fields via `config-crate`'s `Environment` source with a
//! double-underscore separator (`LEDGER_MATCHING__MIN_CONFIDENCE=0.8`).

pub mod matching;
pub mod provider;
pub mod runner;

pub use matching::MatchingConfig;
pub use provider::{CircuitBreakerSettings, ProviderManagerConfig, ProviderSettings};
pub use runner::RunnerConfig;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("field '{field}' out of range: {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("invalid configuration: {0}")]
    Inconsistent(String),
    #[error("failed to load configuration: {0}")]
    Load(#[from] config_crate::ConfigError),
}

/// The full configuration surface for one pipeline instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub matching: MatchingConfig,
    pub provider_manager: ProviderManagerConfig,
    pub runner: RunnerConfig,
}

impl PipelineConfig {
    /// Load from an optional TOML file, then let `LEDGER__`-prefixed
    /// environment variables (double-underscore-nested) override individual
    /// fields, e.g. `LEDGER__MATCHING__MIN_CONFIDENCE=0.8`.
    pub fn load(toml_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config_crate::Config::builder();
        if let Some(path) = toml_path {
            builder = builder.add_source(config_crate::File::with_name(path).required(false));
        }
        builder = builder.add_source(
            config_crate::Environment::with_prefix("LEDGER")
                .separator("__")
                .try_parsing(true),
        );
        let raw = builder.build()?;
        let config: PipelineConfig = raw.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate()?;
        self.provider_manager.validate()?;
        Ok(())
    }
}
