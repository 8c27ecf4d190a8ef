//! Core data model for the ledger ingestion and matching pipeline.
//!
//! This crate owns the design-level nouns of the system (account, cursor,
//! import session, raw record, movement, candidate, match, link, provider
//! identity) plus the `Money` decimal wrapper and normalization helpers they
//! are built on. It has no I/O and no async: everything here is plain,
//! serializable data and pure functions over it.

pub mod account;
pub mod ids;
pub mod matching;
pub mod money;
pub mod movement;
pub mod normalize;
pub mod provider;
pub mod raw_record;
pub mod session;

pub use account::{Account, AccountKind, CursorState, StreamType};
pub use ids::{AccountId, AssetId, LinkId, SessionId, TransactionId};
pub use matching::{LinkStatus, LinkType, MatchCriteria, PotentialMatch, TransactionLink, TriState, VarianceMetadata};
pub use money::Money;
pub use movement::{Direction, Movement, SourceKind, TransactionCandidate, UniversalTransaction};
pub use normalize::{normalize_address, normalize_hash, AddressCasing, NormalizedHash};
pub use provider::{ChainModel, CircuitState, Operation, ProviderDescriptor};
pub use raw_record::{ProcessingStatus, RawRecord, SaveBatchResult};
pub use session::{ImportSession, SessionStatus};
