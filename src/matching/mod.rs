//! Approximate name matching engine.
//!
//! This module provides the core matching functionality:
//!
//! - [`alignment`]: greedy common-substring alignment of two strings
//! - [`SimilarityScorer`]: 0-100 similarity scores built on the alignment
//! - [`CandidateFunnel`]: ranks a candidate pool for one query
//! - [`BatchMatcher`]: runs many queries, sequentially or in parallel
//!
//! ## Matching Algorithm
//!
//! Each query passes through a funnel whose stages only ever shrink the set
//! of candidates:
//!
//! 1. **Quick filter**: drop candidates whose length-based upper bound is
//!    already below the threshold (primary field, then secondary field)
//! 2. **Primary scoring**: exact alignment score, optionally retried with the
//!    words of both strings sorted
//! 3. **Secondary scoring**: the same on the secondary field
//! 4. **Ranking**: geometric mean of both field scores, top-N
//!
//! ## Scoring
//!
//! `score = floor(100 * matched / (matched + penalty))`, where the penalty
//! counts every unaligned character of both strings and weighs unaligned
//! digits by the configured multiplier.
//!
//! ## Example
//!
//! ```rust
//! use fund_linker::{CandidateFunnel, CandidatePool, CandidateRecord, MatchingConfig, Query};
//!
//! let pool: CandidatePool = vec![
//!     CandidateRecord::new("vanguard index", "500", 1u64),
//!     CandidateRecord::new("vanguard index", "total stock market", 2u64),
//! ]
//! .into_iter()
//! .collect();
//!
//! let funnel = CandidateFunnel::new(&pool, &MatchingConfig::default()).unwrap();
//! let result = funnel.find_matches(&Query::new("vanguard index", "500")).unwrap();
//!
//! for m in &result {
//!     println!("{} ({}) {}", m.label, m.score, m.flag);
//! }
//! assert_eq!(result.best().unwrap().id.as_str(), "1");
//! ```

pub mod alignment;
pub mod batch;
pub mod engine;
pub mod scoring;

pub use batch::{BatchMatcher, ExecutionMode};
pub use engine::{CandidateFunnel, FunnelOptions, MatchingConfig, TopN};
pub use scoring::SimilarityScorer;
