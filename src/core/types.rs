use serde::{Deserialize, Serialize};

/// Caller-supplied identifier for a candidate record.
///
/// The engine never interprets the value; it is carried alongside its record
/// through every funnel stage and handed back in the results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A normalized name to be matched against the candidate pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Owner-level name (e.g. the registrant)
    pub primary: String,

    /// Sub-entity name (e.g. the fund)
    pub secondary: String,
}

impl Query {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Display label in the `"{primary} : {secondary}"` form used for output
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} : {}", self.primary, self.secondary)
    }
}

/// A normalized name in the candidate pool, tagged with its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub primary: String,
    pub secondary: String,
    pub id: RecordId,
}

impl CandidateRecord {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        id: impl Into<RecordId>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} : {}", self.primary, self.secondary)
    }
}

/// Marks how a match was obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchFlag {
    /// Plain character alignment was enough
    #[default]
    #[serde(rename = "")]
    None,
    /// Sorting the words of at least one field raised its score
    #[serde(rename = "OR")]
    OrderIrrelevant,
}

impl MatchFlag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::OrderIrrelevant => "OR",
        }
    }
}

impl std::fmt::Display for MatchFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked entry of a [`MatchResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// `"{primary} : {secondary}"` of the matched candidate
    pub label: String,

    /// Weighted score in `0..=100`
    pub score: u8,

    /// Identifier of the matched candidate record
    pub id: RecordId,

    pub flag: MatchFlag,
}

/// Ranked, non-empty list of matches for one query.
///
/// A query with no candidate above threshold has no `MatchResult` at all;
/// callers see `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    matches: Vec<MatchCandidate>,
}

impl MatchResult {
    /// Wrap an already ranked list, returning `None` when it is empty
    #[must_use]
    pub fn from_ranked(matches: Vec<MatchCandidate>) -> Option<Self> {
        if matches.is_empty() {
            None
        } else {
            Some(Self { matches })
        }
    }

    /// Highest-ranked match; only `None` for a result deserialized from an
    /// empty list
    #[must_use]
    pub fn best(&self) -> Option<&MatchCandidate> {
        self.matches.first()
    }

    #[must_use]
    pub fn matches(&self) -> &[MatchCandidate] {
        &self.matches
    }

    #[must_use]
    pub fn into_matches(self) -> Vec<MatchCandidate> {
        self.matches
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchCandidate> {
        self.matches.iter()
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = &'a MatchCandidate;
    type IntoIter = std::slice::Iter<'a, MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
