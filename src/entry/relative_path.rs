use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use derive_more::Display;
use snafu::Snafu;

const SEPARATOR: char = '/';

/// A path relative to an overlay or snapshot root.
///
/// Always stored with `/` separators and without leading, trailing or
/// repeated separators. Paths that climb out of the root are rejected.
///
/// Ordering is component-wise: a directory sorts before everything beneath
/// it, and siblings sort lexicographically. This keeps a directory's whole
/// subtree contiguous, e.g. `a`, `a/b`, `a-c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Encode, Decode)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RelativePathError> {
        let raw = raw.as_ref();
        let mut components = Vec::new();

        for component in raw.split(['/', '\\']) {
            match component {
                "" | "." => continue,
                ".." => {
                    return Err(RelativePathError::Escape {
                        path: raw.to_string(),
                    });
                }
                _ => components.push(component),
            }
        }

        if components.is_empty() {
            return Err(RelativePathError::Empty);
        }

        Ok(Self(components.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// A path made of one directory entry name, taken as it is on disk.
    pub(crate) fn from_name(name: &OsStr) -> Result<Self, RelativePathError> {
        Ok(Self(checked_name(name)?.to_string()))
    }

    /// `self` extended by one directory entry name. Unlike [`RelativePath::new`]
    /// only `/` separates components, so a `\` stays part of the name.
    pub(crate) fn child(&self, name: &OsStr) -> Result<Self, RelativePathError> {
        Ok(Self(format!("{}{SEPARATOR}{}", self.0, checked_name(name)?)))
    }

    /// True when `self` is a strict ancestor directory of `other`.
    pub fn is_ancestor_of(&self, other: &RelativePath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == SEPARATOR as u8
    }

    /// Location of this path below a physical root.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.components()
            .fold(root.to_path_buf(), |path, component| path.join(component))
    }
}

fn checked_name(name: &OsStr) -> Result<&str, RelativePathError> {
    let checked = name.to_str().ok_or_else(|| RelativePathError::NotUnicode {
        name: name.to_string_lossy().into_owned(),
    })?;

    if matches!(checked, "" | "." | "..") || checked.contains(SEPARATOR) {
        return Err(RelativePathError::InvalidName {
            name: checked.to_string(),
        });
    }
    Ok(checked)
}

impl Ord for RelativePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl PartialOrd for RelativePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = RelativePathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum RelativePathError {
    #[snafu(display("Path is empty or refers to the root itself"))]
    Empty,
    #[snafu(display("Path '{}' escapes its root", path))]
    Escape { path: String },
    #[snafu(display("Name '{}' is not valid UTF-8", name))]
    NotUnicode { name: String },
    #[snafu(display("'{}' is not a single path component", name))]
    InvalidName { name: String },
}
