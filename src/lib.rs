//! # fund-linker
//!
//! A library for linking entity names across datasets that share no common
//! identifier.
//!
//! Mutual fund names appear in regulatory filings as `"REGISTRANT : FUND"`,
//! but each source spells them differently: abbreviations, punctuation, word
//! order, share-class suffixes. `fund-linker` normalizes both sides with a
//! configurable rule set and ranks, for every query name, the candidate names
//! whose registrant and fund both score above a threshold.
//!
//! ## Features
//!
//! - **Digit-weighted scoring**: unmatched digits cost more than letters, so
//!   "target 2030" and "target 2040" stay apart
//! - **Funnel matching**: cheap length bounds discard most candidates before
//!   any alignment is computed
//! - **Order-irrelevant rescoring**: "high yield" matches "yield high", and
//!   such matches are flagged
//! - **Parallel batches**: queries are spread over a worker pool with results
//!   in input order
//! - **Matching horizon**: dated lists are matched month by month
//!
//! ## Example
//!
//! ```rust
//! use fund_linker::{BatchMatcher, CandidatePool, CandidateRecord, ExecutionMode};
//! use fund_linker::{MatchingConfig, Query};
//!
//! let pool: CandidatePool = vec![
//!     CandidateRecord::new("abc", "growth", 1u64),
//!     CandidateRecord::new("abc", "income", 2u64),
//! ]
//! .into_iter()
//! .collect();
//!
//! let matcher = BatchMatcher::new(MatchingConfig::default(), ExecutionMode::Sequential).unwrap();
//! let results = matcher
//!     .map(&[Query::new("abc", "growth"), Query::new("xyz", "value")], &pool)
//!     .unwrap();
//!
//! assert_eq!(results[0].as_ref().unwrap().best().unwrap().id.as_str(), "1");
//! assert!(results[1].is_none());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Records, queries, results and errors
//! - [`matching`]: Alignment, scoring, the candidate funnel and batch runner
//! - [`preprocessing`]: Name normalization rules
//! - [`parsing`]: CSV loaders for query and candidate lists
//! - [`orchestration`]: Month windows, linking and result output
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod orchestration;
pub mod parsing;
pub mod preprocessing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::error::MatchError;
pub use core::pool::CandidatePool;
pub use core::types::*;
pub use matching::batch::{BatchMatcher, ExecutionMode};
pub use matching::engine::{CandidateFunnel, FunnelOptions, MatchingConfig, TopN};
pub use matching::scoring::SimilarityScorer;
