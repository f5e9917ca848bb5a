use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::MatchError;
use crate::core::pool::CandidatePool;
use crate::core::types::{CandidateRecord, MatchCandidate, MatchFlag, MatchResult, Query};
use crate::matching::scoring::{weighted_score, PreparedQuery, SimilarityScorer};
use crate::utils::validation::{validate_threshold, MAX_SCORE};

/// Default minimum score each field must reach
pub const DEFAULT_VALID_THRESHOLD: u32 = 95;

/// Default penalty multiplier for unmatched digits
pub const DEFAULT_DIGIT_MULTIPLIER: f64 = 3.0;

/// Token-sorted rescoring is skipped for raw scores below
/// `valid_threshold / TOKEN_RESCORE_DIVISOR`.
///
/// This trades recall for speed: a pair whose raw score falls under the
/// cutoff is dropped even if reordering its words would make it a perfect
/// match. Halving the threshold was too aggressive on fund names.
pub const TOKEN_RESCORE_DIVISOR: u8 = 3;

/// How many ranked matches to keep per query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopN {
    /// Keep every candidate that clears the threshold
    #[default]
    Unbounded,
    /// Keep at most this many (must be at least 1)
    Limit(usize),
}

impl TopN {
    fn validated(self) -> Result<Self, MatchError> {
        match self {
            Self::Limit(0) => Err(MatchError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            )),
            other => Ok(other),
        }
    }

    fn apply<T>(self, ranked: &mut Vec<T>) {
        if let Self::Limit(n) = self {
            ranked.truncate(n);
        }
    }
}

/// Optional funnel stages, fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelOptions {
    /// Drop candidates whose length-based upper bound is already below the
    /// threshold, before any alignment is computed. Never loses a match when
    /// the digit multiplier is at least 1.
    pub quick_comparison: bool,

    /// Retry each field with its words sorted alphabetically and keep the
    /// better score, flagging improved matches with `OR`.
    pub order_irrelevance: bool,
}

impl Default for FunnelOptions {
    fn default() -> Self {
        Self {
            quick_comparison: true,
            order_irrelevance: true,
        }
    }
}

/// Configuration for the candidate funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score (0-100) both the primary and secondary field must reach
    pub valid_threshold: u32,
    /// Penalty multiplier for unmatched digits (> 0)
    pub digit_multiplier: f64,
    /// Number of ranked matches to keep
    pub top_n: TopN,
    pub options: FunnelOptions,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            valid_threshold: DEFAULT_VALID_THRESHOLD,
            digit_multiplier: DEFAULT_DIGIT_MULTIPLIER,
            top_n: TopN::default(),
            options: FunnelOptions::default(),
        }
    }
}

impl MatchingConfig {
    /// Check every setting without building a funnel.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` for a threshold above 100, a
    /// non-positive digit multiplier, or `TopN::Limit(0)`.
    pub fn validate(&self) -> Result<(), MatchError> {
        validate_threshold(self.valid_threshold)?;
        SimilarityScorer::new(self.digit_multiplier)?;
        self.top_n.validated()?;
        Ok(())
    }
}

/// Which half of a record a stage works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Primary,
    Secondary,
}

impl Field {
    fn of_query(self, query: &Query) -> &str {
        match self {
            Self::Primary => &query.primary,
            Self::Secondary => &query.secondary,
        }
    }

    fn of_record(self, record: &CandidateRecord) -> &str {
        match self {
            Self::Primary => &record.primary,
            Self::Secondary => &record.secondary,
        }
    }
}

/// A candidate still in the running, with the scores gathered so far
#[derive(Debug, Clone)]
struct Survivor<'a> {
    record: &'a CandidateRecord,
    primary_score: u8,
    secondary_score: u8,
    improved: bool,
}

impl<'a> Survivor<'a> {
    fn new(record: &'a CandidateRecord) -> Self {
        Self {
            record,
            primary_score: 0,
            secondary_score: 0,
            improved: false,
        }
    }

    fn score_mut(&mut self, field: Field) -> &mut u8 {
        match field {
            Field::Primary => &mut self.primary_score,
            Field::Secondary => &mut self.secondary_score,
        }
    }

    /// Geometric mean of both field scores, rounded down
    fn weighted_score(&self) -> u8 {
        weighted_score(self.primary_score, self.secondary_score)
    }
}

/// Runs one query through the filter/score/prune stages against a pool.
///
/// Stages, each working on the survivors of the previous one:
///
/// 1. quick filter on both fields (optional)
/// 2. primary field scoring, with optional token-sorted rescoring
/// 3. secondary field scoring, likewise
/// 4. geometric-mean weighting, ranking and top-N cut
///
/// The funnel returns `None` as soon as no candidate is left.
#[derive(Debug)]
pub struct CandidateFunnel<'a> {
    pool: &'a CandidatePool,
    scorer: SimilarityScorer,
    threshold: u8,
    top_n: TopN,
    options: FunnelOptions,
}

impl<'a> CandidateFunnel<'a> {
    /// Create a funnel over `pool`.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` if any setting is out of range.
    pub fn new(pool: &'a CandidatePool, config: &MatchingConfig) -> Result<Self, MatchError> {
        Ok(Self {
            pool,
            scorer: SimilarityScorer::new(config.digit_multiplier)?,
            threshold: validate_threshold(config.valid_threshold)?,
            top_n: config.top_n.validated()?,
            options: config.options,
        })
    }

    /// Find the best ranked candidates for `query`, or `None` if no candidate
    /// reaches the threshold on both fields
    #[must_use]
    pub fn find_matches(&self, query: &Query) -> Option<MatchResult> {
        let mut survivors: Vec<Survivor<'a>> = self.pool.iter().map(Survivor::new).collect();
        if survivors.is_empty() {
            return None;
        }

        if self.options.quick_comparison {
            for field in [Field::Primary, Field::Secondary] {
                self.quick_filter(&mut survivors, field, field.of_query(query));
                debug!(
                    stage = "quick",
                    ?field,
                    remaining = survivors.len(),
                    "Quick filter applied"
                );
                if survivors.is_empty() {
                    return None;
                }
            }
        }

        for field in [Field::Primary, Field::Secondary] {
            self.score_field(&mut survivors, field, field.of_query(query));
            debug!(
                stage = "score",
                ?field,
                remaining = survivors.len(),
                "Field scored"
            );
            if survivors.is_empty() {
                return None;
            }
        }

        self.finalize(survivors)
    }

    /// Find the single best match
    #[must_use]
    pub fn find_best_match(&self, query: &Query) -> Option<MatchCandidate> {
        self.find_matches(query)
            .and_then(|result| result.into_matches().into_iter().next())
    }

    fn quick_filter(&self, survivors: &mut Vec<Survivor<'a>>, field: Field, query_text: &str) {
        let prepared = self.scorer.prepare(query_text);
        survivors.retain(|s| {
            prepared.real_quick_ratio(field.of_record(s.record)) >= self.threshold
        });
    }

    fn score_field(&self, survivors: &mut Vec<Survivor<'a>>, field: Field, query_text: &str) {
        let prepared = self.scorer.prepare(query_text);
        for survivor in survivors.iter_mut() {
            let candidate = field.of_record(survivor.record);
            let raw = prepared.score(candidate);
            let (score, improved) = if self.options.order_irrelevance {
                self.rescore_unordered(&prepared, candidate, raw)
            } else {
                (raw, false)
            };
            *survivor.score_mut(field) = score;
            survivor.improved |= improved;
        }
        survivors.retain_mut(|s| *s.score_mut(field) >= self.threshold);
    }

    /// Token-sorted retry of a raw score; returns the better score and
    /// whether the retry strictly improved it
    fn rescore_unordered(&self, prepared: &PreparedQuery<'_>, candidate: &str, raw: u8) -> (u8, bool) {
        if raw == MAX_SCORE || raw < self.threshold / TOKEN_RESCORE_DIVISOR {
            return (raw, false);
        }
        let sorted = prepared.token_sorted_score(candidate);
        if sorted > raw {
            (sorted, true)
        } else {
            (raw, false)
        }
    }

    fn finalize(&self, survivors: Vec<Survivor<'a>>) -> Option<MatchResult> {
        let mut ranked: Vec<(u8, Survivor<'a>)> = survivors
            .into_iter()
            .map(|s| (s.weighted_score(), s))
            .collect();

        // Stable sort: equal scores keep pool order, so the earliest record wins
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        self.top_n.apply(&mut ranked);

        let matches = ranked
            .into_iter()
            .map(|(score, s)| MatchCandidate {
                label: s.record.label(),
                score,
                id: s.record.id.clone(),
                flag: if s.improved {
                    MatchFlag::OrderIrrelevant
                } else {
                    MatchFlag::None
                },
            })
            .collect();

        MatchResult::from_ranked(matches)
    }
}
