use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::MatchError;
use crate::core::pool::CandidatePool;
use crate::core::types::{CandidateRecord, MatchFlag, MatchResult, Query, RecordId};
use crate::matching::batch::BatchMatcher;
use crate::parsing::records::{CandidateRow, QueryRow};
use crate::preprocessing::normalize::Preprocessor;

/// Calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0
    #[must_use]
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Shift by a signed number of months
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn offset(self, months: i32) -> Self {
        let ordinal = self.ordinal() + i64::from(months);
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}", self.year, self.month)
    }
}

/// Range of candidate months matched against a query month, relative to it
/// and inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingHorizon {
    pub start_months: i32,
    pub end_months: i32,
}

impl Default for MatchingHorizon {
    fn default() -> Self {
        Self {
            start_months: -8,
            end_months: 3,
        }
    }
}

impl MatchingHorizon {
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` if the range is empty.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.start_months > self.end_months {
            return Err(MatchError::InvalidConfig(format!(
                "horizon start ({}) must not be after horizon end ({})",
                self.start_months, self.end_months
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, period: YearMonth, candidate: YearMonth) -> bool {
        (period.offset(self.start_months)..=period.offset(self.end_months)).contains(&candidate)
    }
}

/// One unit of matching work: a set of queries and the candidates they may
/// match, both as indices into the loaded rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWindow {
    /// `None` for the single undated window
    pub period: Option<YearMonth>,
    pub queries: Vec<usize>,
    pub candidates: Vec<usize>,
}

/// Split the rows into matching windows.
///
/// Without a horizon everything lands in one window. With a horizon queries
/// are grouped by month, in ascending order, and each group sees only the
/// candidates dated inside its horizon. Undated rows are left out of every
/// dated window.
#[must_use]
pub fn build_windows(
    queries: &[QueryRow],
    candidates: &[CandidateRow],
    horizon: Option<&MatchingHorizon>,
) -> Vec<MatchWindow> {
    let Some(horizon) = horizon else {
        return vec![MatchWindow {
            period: None,
            queries: (0..queries.len()).collect(),
            candidates: (0..candidates.len()).collect(),
        }];
    };

    let mut groups: BTreeMap<YearMonth, Vec<usize>> = BTreeMap::new();
    for (index, row) in queries.iter().enumerate() {
        match row.date {
            Some(date) => groups.entry(YearMonth::from_date(date)).or_default().push(index),
            None => warn!(line = row.line, id = %row.id, "Query has no date; not matched"),
        }
    }

    let candidate_months: Vec<Option<YearMonth>> = candidates
        .iter()
        .map(|row| row.date.map(YearMonth::from_date))
        .collect();
    let undated = candidate_months.iter().filter(|m| m.is_none()).count();
    if undated > 0 {
        warn!(count = undated, "Candidates without a date are never matched");
    }

    groups
        .into_iter()
        .map(|(period, queries)| {
            let candidates = candidate_months
                .iter()
                .enumerate()
                .filter_map(|(i, month)| {
                    month
                        .filter(|m| horizon.contains(period, *m))
                        .map(|_| i)
                })
                .collect();
            MatchWindow {
                period: Some(period),
                queries,
                candidates,
            }
        })
        .collect()
}

/// A candidate linked to a query, with both its raw and normalized name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedMatch {
    pub name: String,
    pub name_preproc: String,
    pub score: u8,
    pub flag: MatchFlag,
    pub id: RecordId,
}

/// Outcome for one input query row; `matches` is empty when nothing cleared
/// the threshold or the row was malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedQuery {
    pub id: String,
    pub name: String,
    pub name_preproc: String,
    pub period: Option<YearMonth>,
    pub matches: Vec<LinkedMatch>,
}

impl LinkedQuery {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Drives the whole pipeline: normalize both lists, split them into windows
/// and match each window.
pub struct Linker {
    preprocessor: Preprocessor,
    matcher: BatchMatcher,
    horizon: Option<MatchingHorizon>,
}

impl Linker {
    /// Create a linker; a `horizon` of `None` matches everything against
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` for an empty horizon.
    pub fn new(
        preprocessor: Preprocessor,
        matcher: BatchMatcher,
        horizon: Option<MatchingHorizon>,
    ) -> Result<Self, MatchError> {
        if let Some(h) = &horizon {
            h.validate()?;
        }
        Ok(Self {
            preprocessor,
            matcher,
            horizon,
        })
    }

    /// Link every query row, returning one entry per row in input order.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` if a window's funnel cannot be
    /// built.
    pub fn link(
        &self,
        queries: &[QueryRow],
        candidates: &[CandidateRow],
    ) -> Result<Vec<LinkedQuery>, MatchError> {
        let records: Vec<CandidateRecord> = candidates
            .iter()
            .map(|row| {
                let (primary, secondary) = self.preprocessor.normalize(&row.raw_name);
                CandidateRecord::new(primary, secondary, row.id.clone())
            })
            .collect();
        let raw_names: HashMap<&RecordId, &str> = candidates
            .iter()
            .map(|row| (&row.id, row.raw_name.as_str()))
            .collect();

        let normalized: Vec<Option<Query>> = queries
            .iter()
            .map(|row| {
                row.raw_name.as_deref().map(|raw| {
                    let (primary, secondary) = self.preprocessor.normalize(raw);
                    Query::new(primary, secondary)
                })
            })
            .collect();

        let mut linked: Vec<LinkedQuery> = queries
            .iter()
            .zip(&normalized)
            .map(|(row, query)| LinkedQuery {
                id: row.id.clone(),
                name: row.raw_name.clone().unwrap_or_default(),
                name_preproc: query.as_ref().map(Query::label).unwrap_or_default(),
                period: row.date.map(YearMonth::from_date),
                matches: Vec::new(),
            })
            .collect();

        let windows = build_windows(queries, candidates, self.horizon.as_ref());
        debug!(windows = windows.len(), "Built matching windows");

        for window in windows {
            let started = Instant::now();
            let pool: CandidatePool = window
                .candidates
                .iter()
                .map(|&i| records[i].clone())
                .collect();
            let slots: Vec<Option<Query>> = window
                .queries
                .iter()
                .map(|&i| normalized[i].clone())
                .collect();

            let results = self.matcher.map_slots(&slots, &pool)?;
            for (&index, result) in window.queries.iter().zip(results) {
                if let Some(result) = result {
                    linked[index].matches = link_matches(&result, &raw_names);
                }
            }

            let period = window
                .period
                .map_or_else(|| "all periods".to_string(), |p| p.to_string());
            info!(
                "Finished matching {} queries against {} candidates for {} in {:.2?}",
                window.queries.len(),
                pool.len(),
                period,
                started.elapsed()
            );
        }

        Ok(linked)
    }
}

fn link_matches(result: &MatchResult, raw_names: &HashMap<&RecordId, &str>) -> Vec<LinkedMatch> {
    result
        .iter()
        .map(|m| LinkedMatch {
            name: raw_names.get(&m.id).copied().unwrap_or_default().to_string(),
            name_preproc: m.label.clone(),
            score: m.score,
            flag: m.flag,
            id: m.id.clone(),
        })
        .collect()
}
