//! Stable identifier newtypes.
//!
//! Distinct types prevent accidentally passing an `AccountId` where a
//! `SessionId` is expected — a mistake the reference workspace's
//! `InstrumentId` family of types exists to rule out for instrument
//! identity; here the same discipline applies to ledger identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(AccountId, "A user-owned data source.");
uuid_id!(SessionId, "One run of the runner against one account.");
uuid_id!(TransactionId, "A universal transaction produced by a processor.");
uuid_id!(LinkId, "A persisted transaction link.");

/// A namespaced asset identifier: `blockchain:<chain>:<contract-or-native>`
/// or `exchange:<name>:<ticker-lowercased>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn blockchain(chain: &str, unit: &str) -> Self {
        AssetId(format!("blockchain:{}:{}", chain.to_lowercase(), unit.to_lowercase()))
    }

    pub fn exchange(name: &str, ticker: &str) -> Self {
        AssetId(format!("exchange:{}:{}", name.to_lowercase(), ticker.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        AssetId(value)
    }
}
