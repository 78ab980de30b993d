//! Point-in-time listings of directory trees.

#[allow(clippy::module_inception)]
mod snapshot;
pub mod store;
mod walker;

pub use snapshot::Snapshot;
pub use walker::{WalkError, walk};
