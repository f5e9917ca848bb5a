use crate::core::types::CandidateRecord;

/// Ordered, read-only collection of candidate records.
///
/// A pool is built once per matching window and then only borrowed; matching
/// never mutates it, so one pool can be shared by any number of workers.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    records: Vec<CandidateRecord>,
}

impl CandidatePool {
    #[must_use]
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateRecord> {
        self.records.iter()
    }
}

impl FromIterator<CandidateRecord> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = CandidateRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a CandidateRecord;
    type IntoIter = std::slice::Iter<'a, CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
