//! The transfer-matching engine (spec §4.4): candidate construction,
//! per-pair scoring, hash matching, deduplication, and link validation.

pub mod candidates;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod hash_match;
pub mod link;
pub mod outflow_adjust;
pub mod scoring;

pub use candidates::{build_candidates, CandidateSet};
pub use dedup::{deduplicate_and_confirm, Disposition};
pub use engine::MatchingEngine;
pub use error::{MatchingError, Result};
pub use hash_match::find_hash_match;
pub use link::{build_link, validate_match};
pub use outflow_adjust::{adjust_outflow_group, OutflowAdjustment};
