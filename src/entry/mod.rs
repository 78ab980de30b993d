//! Descriptions of single filesystem nodes and the paths that name them.

#[allow(clippy::module_inception)]
mod entry;
mod relative_path;

pub use entry::{Entry, EntryKind};
pub use relative_path::{RelativePath, RelativePathError};
