use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::{debug, info};

use crate::entry::{Entry, EntryKind, RelativePath};
use crate::ext::BestEffortPathExt;
use crate::overlay::DirtyLog;
use crate::overlay::error::*;
use crate::patch::{Patch, PatchOperation, calculate_patch};
use crate::snapshot::{Snapshot, walk};

/// One logical tree over an input root and an output root.
///
/// Reads go to the output root for every path the current pass has touched
/// and to the input root otherwise. Writes always land in the output root
/// and are recorded in the [`DirtyLog`]. The log is only updated after the
/// physical operation succeeded.
#[derive(Debug)]
pub struct Overlay {
    input: PathBuf,
    output: PathBuf,
    dirty: DirtyLog,
    input_snapshot: Snapshot,
}

impl Overlay {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let overlay = Self {
            input: input.into(),
            output: output.into(),
            dirty: DirtyLog::new(),
            input_snapshot: Snapshot::empty(),
        };
        debug!(
            "Created overlay with input {} and output {}",
            overlay.input.best_effort_path_display(),
            overlay.output.best_effort_path_display()
        );
        overlay
    }

    pub fn input_root(&self) -> &Path {
        &self.input
    }

    pub fn output_root(&self) -> &Path {
        &self.output
    }

    pub fn dirty_log(&self) -> &DirtyLog {
        &self.dirty
    }

    /// The root that currently owns `path`.
    pub fn resolve_root(&self, path: impl AsRef<str>) -> Result<&Path, OverlayError> {
        let path = parse(path)?;
        Ok(self.root_for(&path))
    }

    pub fn exists(&self, path: impl AsRef<str>) -> Result<bool, OverlayError> {
        let physical = self.physical(path)?;
        physical.try_exists().context(StatSnafu { path: physical })
    }

    pub fn read_file(&self, path: impl AsRef<str>) -> Result<Vec<u8>, OverlayError> {
        let physical = self.physical(path)?;
        fs::read(&physical).context(ReadSnafu { path: physical })
    }

    pub fn read_to_string(&self, path: impl AsRef<str>) -> Result<String, OverlayError> {
        let physical = self.physical(path)?;
        fs::read_to_string(&physical).context(ReadSnafu { path: physical })
    }

    /// Names of the entries of a directory, sorted. A name that is not
    /// valid UTF-8 fails the listing, since no overlay path could name it.
    pub fn list_directory(&self, path: impl AsRef<str>) -> Result<Vec<String>, OverlayError> {
        let physical = self.physical(path)?;
        let mut names = fs::read_dir(&physical)
            .and_then(|items| {
                items
                    .map(|item| item.map(|item| item.file_name()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .context(ListDirSnafu {
                path: physical.clone(),
            })?
            .into_iter()
            .map(|name| {
                name.into_string().map_err(|name| OverlayError::NotUnicodeError {
                    path: physical.join(name),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        names.sort();
        Ok(names)
    }

    /// Writes `content` to the output root.
    ///
    /// A path whose last record already left a written file behind is
    /// recorded as an update, anything else as a create.
    pub fn write_file(
        &mut self,
        path: impl AsRef<str>,
        content: impl AsRef<[u8]>,
    ) -> Result<(), OverlayError> {
        let path = parse(path)?;
        let physical = path.to_path(&self.output);

        fs::write(&physical, content).context(WriteSnafu {
            path: physical.clone(),
        })?;
        let entry = Entry::from_path(&self.output, path.clone()).context(StatSnafu {
            path: physical,
        })?;

        let record = if self.dirty.holds_written_file(&path) {
            PatchOperation::update(entry)
        } else {
            PatchOperation::creation(entry)
        };
        debug!("Wrote '{}' as {}", path, record.operation());
        self.dirty.record(record);
        Ok(())
    }

    /// Deletes the output root's copy of a file. A file that is not there
    /// counts as removed; the input root is left alone either way.
    pub fn remove_file(&mut self, path: impl AsRef<str>) -> Result<(), OverlayError> {
        let path = parse(path)?;
        let physical = path.to_path(&self.output);

        match fs::remove_file(&physical) {
            Ok(()) => debug!("Removed '{}'", path),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("'{}' already absent from the output root", path)
            }
            Err(error) => return Err(error).context(RemoveFileSnafu { path: physical }),
        }

        self.dirty
            .record(PatchOperation::removal(EntryKind::File, path));
        Ok(())
    }

    pub fn make_directory(&mut self, path: impl AsRef<str>) -> Result<(), OverlayError> {
        let path = parse(path)?;
        let physical = path.to_path(&self.output);

        fs::create_dir(&physical).context(CreateDirSnafu {
            path: physical.clone(),
        })?;
        let entry = Entry::from_path(&self.output, path.clone()).context(StatSnafu {
            path: physical,
        })?;

        debug!("Created directory '{}'", path);
        self.dirty.record(PatchOperation::creation(entry));
        Ok(())
    }

    /// Removes an empty directory from whichever root currently owns it.
    pub fn remove_directory(&mut self, path: impl AsRef<str>) -> Result<(), OverlayError> {
        let path = parse(path)?;
        let physical = path.to_path(self.root_for(&path));

        fs::remove_dir(&physical).context(RemoveDirSnafu { path: physical })?;

        debug!("Removed directory '{}'", path);
        self.dirty
            .record(PatchOperation::removal(EntryKind::Directory, path));
        Ok(())
    }

    /// Writing only when the content differs is not implemented.
    pub fn write_if_content_changed(
        &mut self,
        _path: impl AsRef<str>,
        _content: impl AsRef<[u8]>,
    ) -> Result<(), OverlayError> {
        Err(OverlayError::Unsupported {
            operation: "write_if_content_changed",
        })
    }

    /// Everything written through this overlay, ordered for replay.
    pub fn output_changes(&self) -> Patch {
        self.dirty.to_patch()
    }

    /// What changed in the input root since the previous call. The first
    /// call compares against an empty tree.
    pub fn input_changes(&mut self) -> Result<Patch, OverlayError> {
        let next = walk(&self.input).context(InputWalkSnafu)?;
        let patch = calculate_patch(&self.input_snapshot, &next);
        self.input_snapshot = next;

        info!("Input root changed by {} operations", patch.len());
        Ok(patch)
    }

    fn root_for(&self, path: &RelativePath) -> &Path {
        if self.dirty.contains(path) {
            &self.output
        } else {
            &self.input
        }
    }

    fn physical(&self, path: impl AsRef<str>) -> Result<PathBuf, OverlayError> {
        let path = parse(path)?;
        Ok(path.to_path(self.root_for(&path)))
    }
}

fn parse(path: impl AsRef<str>) -> Result<RelativePath, OverlayError> {
    RelativePath::new(path).context(InvalidPathSnafu)
}
