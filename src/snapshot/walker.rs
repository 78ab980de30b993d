use std::fs;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::entry::{Entry, RelativePath, RelativePathError};
use crate::ext::BestEffortPathExt;
use crate::snapshot::Snapshot;

/// Enumerates every file and directory below `root` into a [`Snapshot`].
///
/// The root itself is not part of the result. Symlinks are followed, the
/// same way a plain `stat` would.
pub fn walk(root: &Path) -> Result<Snapshot, WalkError> {
    debug!("Walking {}", root.best_effort_path_display());

    let mut entries = Vec::new();
    walk_directory(root, None, &mut entries)?;

    debug!("Collected {} entries", entries.len());
    Ok(Snapshot::from_entries(entries))
}

fn walk_directory(
    root: &Path,
    directory: Option<&RelativePath>,
    entries: &mut Vec<Entry>,
) -> Result<(), WalkError> {
    let physical = match directory {
        Some(relative) => relative.to_path(root),
        None => root.to_path_buf(),
    };

    let mut names = fs::read_dir(&physical)
        .context(ReadDirSnafu {
            path: physical.clone(),
        })?
        .map(|item| {
            item.map(|item| item.file_name())
                .context(ReadDirSnafu {
                    path: physical.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    names.sort();

    for name in names {
        let relative = match directory {
            Some(parent) => parent.child(&name),
            None => RelativePath::from_name(&name),
        }
        .context(NameSnafu {
            path: physical.join(&name),
        })?;

        let entry = Entry::from_path(root, relative.clone()).context(StatSnafu {
            path: relative.to_path(root),
        })?;
        trace!("Found {} '{}'", entry.kind(), relative);

        let descend = entry.is_directory();
        entries.push(entry);
        if descend {
            walk_directory(root, Some(&relative), entries)?;
        }
    }

    Ok(())
}

#[derive(Debug, Snafu)]
pub enum WalkError {
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to stat {}", path.best_effort_path_display()))]
    StatError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Cannot name {} relative to its root", path.best_effort_path_display()))]
    NameError {
        path: PathBuf,
        source: RelativePathError,
    },
}

impl WalkError {
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            WalkError::ReadDirError { source, .. } | WalkError::StatError { source, .. } => {
                Some(source.kind())
            }
            WalkError::NameError { .. } => None,
        }
    }
}
