//! Provider contract (spec §6 "Provider contract (adapter-provided)").

use std::collections::HashSet;

use async_trait::async_trait;
use domain::Operation;
use serde_json::Value;

use crate::error::Result;

/// One implementation of some chain/exchange RPC or HTTP API. Adapters
/// provide concrete implementations; the provider manager (§4.2) never
/// speaks a wire protocol itself, only dispatches through this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &HashSet<Operation>;

    fn supports(&self, operation: Operation) -> bool {
        self.capabilities().contains(&operation)
    }

    /// Execute one operation. `args` is an opaque, operation-specific JSON
    /// payload; providers are responsible for interpreting their own shape.
    async fn execute(&self, operation: Operation, args: Value) -> Result<Value>;

    async fn is_healthy(&self) -> Result<bool>;
}
