//! The event payload shape carried on the bus (spec §4.6, §6).

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::{AccountId, SessionId};
use serde::{Deserialize, Serialize};

/// Topic-typed lifecycle signals, mirroring the wire topics of spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ImportSessionStarted,
    ImportSessionCompleted,
    ImportSessionFailed,
    ImportBatchSaved,
    ImportWarning,
    ProviderCall,
    ProviderCircuitOpened,
    ProviderCircuitClosed,
    ProviderCircuitHalfOpen,
    ProviderFailover,
}

/// One event on the bus. Every component that has a lifecycle signal to
/// report constructs one of these; publishing it must never be able to fail
/// the pipeline (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEvent {
    pub topic: Topic,
    /// Correlation id — the session id, when this event is session-scoped.
    pub correlation_id: Option<SessionId>,
    pub account_id: Option<AccountId>,
    pub source_name: Option<String>,
    pub counts: HashMap<String, u64>,
    #[serde(with = "duration_millis_opt")]
    pub duration: Option<Duration>,
    pub metadata: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl ImportEvent {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            correlation_id: None,
            account_id: None,
            source_name: None,
            counts: HashMap::new(),
            duration: None,
            metadata: serde_json::Value::Null,
            emitted_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.correlation_id = Some(session_id);
        self
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn with_count(mut self, key: impl Into<String>, value: u64) -> Self {
        self.counts.insert(key.into(), value);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

mod duration_millis_opt {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis: Option<u64> = Option::deserialize(d)?;
        Ok(millis.map(Duration::from_millis))
    }
}
