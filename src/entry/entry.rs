use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bincode::{Decode, Encode};
use derive_more::Display;

use crate::entry::RelativePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Encode, Decode)]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// Immutable description of a single filesystem node below some root.
///
/// Two entries describe the same node when their relative paths are equal,
/// whatever their metadata says.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Entry {
    kind: EntryKind,
    size: u64,
    mtime: SystemTime,
    mode: u32,
    relative_path: RelativePath,
    base_path: PathBuf,
}

impl Entry {
    pub fn new(
        kind: EntryKind,
        size: u64,
        mtime: SystemTime,
        mode: u32,
        relative_path: RelativePath,
        base_path: PathBuf,
    ) -> Self {
        Self {
            kind,
            size,
            mtime,
            mode,
            relative_path,
            base_path,
        }
    }

    /// Stats `relative_path` below `base_path` and describes what it finds.
    pub fn from_path(base_path: &Path, relative_path: RelativePath) -> std::io::Result<Self> {
        let metadata = relative_path.to_path(base_path).metadata()?;
        Ok(Self::from_metadata(&metadata, base_path, relative_path))
    }

    pub fn from_metadata(metadata: &Metadata, base_path: &Path, relative_path: RelativePath) -> Self {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Self {
            kind,
            size: metadata.len(),
            // Not every platform records modification times
            mtime: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            mode: permission_bits(metadata),
            relative_path,
            base_path: base_path.to_path_buf(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Physical location of the node.
    pub fn full_path(&self) -> PathBuf {
        self.relative_path.to_path(&self.base_path)
    }

    /// Whether `other` describes a changed version of this node.
    ///
    /// Files compare size, mtime and mode. Directories only compare mode,
    /// their size and mtime move whenever their children do.
    pub fn is_modified(&self, other: &Entry) -> bool {
        match self.kind {
            EntryKind::File => {
                self.size != other.size || self.mtime != other.mtime || self.mode != other.mode
            }
            EntryKind::Directory => self.mode != other.mode,
        }
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, true) => 0o555,
        (true, false) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}
