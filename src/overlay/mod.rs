//! The dual-root overlay and the log of what a pass has written through it.

mod dirty_log;
mod error;
#[allow(clippy::module_inception)]
mod overlay;

pub use dirty_log::DirtyLog;
pub use error::OverlayError;
pub use overlay::Overlay;
