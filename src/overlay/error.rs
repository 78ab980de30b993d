use std::path::PathBuf;

use snafu::Snafu;

use crate::entry::RelativePathError;
use crate::ext::BestEffortPathExt;
use crate::snapshot::WalkError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum OverlayError {
    #[snafu(display("Invalid overlay path"))]
    InvalidPathError { source: RelativePathError },
    #[snafu(display("Failed to read {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ListDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Entry name {} is not valid UTF-8", path.best_effort_path_display()))]
    NotUnicodeError { path: PathBuf },
    #[snafu(display("Failed to write {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to stat {}", path.best_effort_path_display()))]
    StatError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to remove file {}", path.best_effort_path_display()))]
    RemoveFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create directory {}", path.best_effort_path_display()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to remove directory {}", path.best_effort_path_display()))]
    RemoveDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to snapshot the input root"))]
    InputWalkError { source: WalkError },
    #[snafu(display("'{}' is not supported yet", operation))]
    Unsupported { operation: &'static str },
}

impl OverlayError {
    /// Kind of the underlying I/O failure, if there was one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            OverlayError::ReadError { source, .. }
            | OverlayError::ListDirError { source, .. }
            | OverlayError::WriteError { source, .. }
            | OverlayError::StatError { source, .. }
            | OverlayError::RemoveFileError { source, .. }
            | OverlayError::CreateDirError { source, .. }
            | OverlayError::RemoveDirError { source, .. } => Some(source.kind()),
            OverlayError::InputWalkError { source } => source.io_kind(),
            OverlayError::InvalidPathError { .. }
            | OverlayError::NotUnicodeError { .. }
            | OverlayError::Unsupported { .. } => None,
        }
    }
}
