//! Core data types for name linking.
//!
//! - [`Query`]: a normalized `(primary, secondary)` name awaiting a match
//! - [`CandidateRecord`]: a normalized name in the pool, tagged with a [`RecordId`]
//! - [`CandidatePool`]: the ordered, read-only set of candidates for one window
//! - [`MatchCandidate`], [`MatchResult`]: ranked output for one query
//! - [`MatchError`]: engine error taxonomy
//!
//! ## Fields
//!
//! Every name is split into two fields that are scored independently:
//!
//! | Field     | Example (raw)                | Example (normalized) |
//! |-----------|------------------------------|----------------------|
//! | primary   | `Vanguard Index Funds`       | `vanguard index`     |
//! | secondary | `Vanguard 500 Index Fund`    | `500`                |
//!
//! How raw strings become these fields is the job of [`crate::preprocessing`].

pub mod error;
pub mod pool;
pub mod types;

pub use error::MatchError;
pub use pool::CandidatePool;
pub use types::{CandidateRecord, MatchCandidate, MatchFlag, MatchResult, Query, RecordId};
