use std::fmt;

use derive_more::{Deref, Display, IntoIterator};

use crate::entry::{Entry, EntryKind, RelativePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    #[display("create")]
    Create,
    #[display("update")]
    Update,
    #[display("unlink")]
    Unlink,
    #[display("mkdir")]
    Mkdir,
    #[display("rmdir")]
    Rmdir,
}

impl Operation {
    pub fn is_removal(&self) -> bool {
        matches!(self, Operation::Unlink | Operation::Rmdir)
    }

    fn removal_of(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => Operation::Unlink,
            EntryKind::Directory => Operation::Rmdir,
        }
    }

    fn creation_of(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => Operation::Create,
            EntryKind::Directory => Operation::Mkdir,
        }
    }
}

/// One structural change: the operation, the path it applies to and, for
/// anything but a removal, the entry the path ends up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOperation {
    operation: Operation,
    relative_path: RelativePath,
    entry: Option<Entry>,
}

impl PatchOperation {
    /// `create` for files, `mkdir` for directories.
    pub fn creation(entry: Entry) -> Self {
        Self {
            operation: Operation::creation_of(entry.kind()),
            relative_path: entry.relative_path().clone(),
            entry: Some(entry),
        }
    }

    pub fn update(entry: Entry) -> Self {
        Self {
            operation: Operation::Update,
            relative_path: entry.relative_path().clone(),
            entry: Some(entry),
        }
    }

    /// `unlink` for files, `rmdir` for directories.
    pub fn removal(kind: EntryKind, relative_path: RelativePath) -> Self {
        Self {
            operation: Operation::removal_of(kind),
            relative_path,
            entry: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    pub fn is_removal(&self) -> bool {
        self.operation.is_removal()
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.relative_path)
    }
}

/// An ordered sequence of operations. Applying them in order never removes
/// a non-empty directory or writes below a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, IntoIterator)]
pub struct Patch {
    #[into_iterator(owned, ref)]
    operations: Vec<PatchOperation>,
}

impl Patch {
    pub(crate) fn from_ordered(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }

    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }
}
