//! Merge ordering

use std::cmp::Ordering;

use crate::scanner::CandidateFile;

/// What candidates are compared by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Last path segment, byte-wise
    #[default]
    ByFilename,
    /// Last modification time, oldest first
    ByModificationTime,
}

impl SortKey {
    fn compare(self, a: &CandidateFile, b: &CandidateFile) -> Ordering {
        match self {
            SortKey::ByFilename => a.path().file_name().cmp(&b.path().file_name()),
            SortKey::ByModificationTime => a.modified_at().cmp(&b.modified_at()),
        }
    }
}

/// A sort key plus direction, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Order {
    pub key: SortKey,
    pub reversed: bool,
}

impl Order {
    pub fn new(key: SortKey, reversed: bool) -> Self {
        Self { key, reversed }
    }

    /// Stable ascending sort, then the whole sequence is flipped if reversed.
    /// Ties therefore come out in reverse input order when reversed.
    pub fn apply(&self, mut candidates: Vec<CandidateFile>) -> Vec<CandidateFile> {
        let key = self.key;
        candidates.sort_by(|a, b| key.compare(a, b));
        if self.reversed {
            candidates.reverse();
        }
        candidates
    }
}

pub fn order(candidates: Vec<CandidateFile>, key: SortKey, reversed: bool) -> Vec<CandidateFile> {
    Order::new(key, reversed).apply(candidates)
}
