use bincode::{Decode, Encode};
use derive_more::{Deref, IntoIterator};

use crate::entry::{Entry, RelativePath};

/// The complete state of a directory tree at one point in time.
///
/// Entries are strictly sorted by relative path (parents before children)
/// and no path appears twice. Every constructor upholds this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, IntoIterator, Encode, Decode)]
pub struct Snapshot {
    #[into_iterator(owned, ref)]
    entries: Vec<Entry>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts and deduplicates `entries`. The first entry seen for a path wins.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
        entries.dedup_by(|later, earlier| later.relative_path() == earlier.relative_path());
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, path: &RelativePath) -> Option<&Entry> {
        self.entries
            .binary_search_by(|entry| entry.relative_path().cmp(path))
            .ok()
            .map(|index| &self.entries[index])
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.get(path).is_some()
    }
}
