use hashlink::LinkedHashMap;
use tracing::trace;

use crate::entry::RelativePath;
use crate::patch::{Operation, Patch, PatchOperation, order_operations};

/// The most recent mutation issued for every path touched during one pass.
///
/// Presence of a path means the output root owns it from now on. Records are
/// overwritten, never pruned.
#[derive(Debug, Clone, Default)]
pub struct DirtyLog {
    records: LinkedHashMap<RelativePath, PatchOperation>,
}

impl DirtyLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `operation` for its path, replacing any earlier record.
    pub fn record(&mut self, operation: PatchOperation) {
        trace!("Marking '{}' dirty with {}", operation.relative_path(), operation.operation());
        // insert moves an existing key to the back
        self.records
            .insert(operation.relative_path().clone(), operation);
    }

    pub fn get(&self, path: &RelativePath) -> Option<&PatchOperation> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.records.contains_key(path)
    }

    /// Whether the last record for `path` left a file behind.
    pub fn holds_written_file(&self, path: &RelativePath) -> bool {
        self.get(path).is_some_and(|record| {
            matches!(record.operation(), Operation::Create | Operation::Update)
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order their latest mutation happened.
    pub fn iter(&self) -> impl Iterator<Item = &PatchOperation> {
        self.records.values()
    }

    /// Every record, ordered so that replaying them is safe.
    pub fn to_patch(&self) -> Patch {
        order_operations(self.records.values().cloned())
    }
}
