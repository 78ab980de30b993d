//! Structural diffs between snapshots.

mod calculator;
mod operation;

pub use calculator::{calculate_patch, order_operations};
pub use operation::{Operation, Patch, PatchOperation};
