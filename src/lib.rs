//! Change-tracking overlay filesystem for incremental build passes.
//!
//! An [`Overlay`] joins a read-mostly input root and a writable output root
//! into one logical tree. Reads are routed to whichever root owns a path,
//! writes land in the output root and are recorded, and
//! [`Overlay::input_changes`] diffs successive snapshots of the input root
//! into an ordered [`Patch`].

#![allow(clippy::enum_variant_names)]

pub mod entry;
mod ext;
pub mod overlay;
pub mod patch;
pub mod snapshot;

pub use entry::{Entry, EntryKind, RelativePath, RelativePathError};
pub use ext::{BestEffortPathExt, SystemTimeExt};
pub use overlay::{DirtyLog, Overlay, OverlayError};
pub use patch::{Operation, Patch, PatchOperation, calculate_patch, order_operations};
pub use snapshot::{Snapshot, WalkError, walk};
