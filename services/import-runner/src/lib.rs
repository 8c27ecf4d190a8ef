//! The Streaming Import Runner (spec §4.3) and the repository contracts it
//! depends on (spec §6).

pub mod error;
pub mod repository;
pub mod runner;

pub use error::{RepositoryError, Result, RunnerError};
pub use repository::{AccountRepository, ImportSessionRepository, RawDataRepository, RepoResult, TransactionLinkRepository};
pub use runner::ImportRunner;
