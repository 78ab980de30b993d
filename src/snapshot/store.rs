use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::snapshot::Snapshot;

const COMPRESSION_LEVEL: i32 = 3;

/// Encodes `snapshot` and writes it to `path`, creating parent directories.
pub async fn write(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    debug!(
        "Storing snapshot of {} entries at {}",
        snapshot.len(),
        path.best_effort_path_display()
    );

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.context(IoSnafu {
            path: parent.to_path_buf(),
        })?;
    }

    let encoded =
        bincode::encode_to_vec(snapshot, bincode::config::standard()).context(EncodeSnafu)?;
    let compressed = zstd::encode_all(encoded.as_slice(), COMPRESSION_LEVEL).context(IoSnafu {
        path: path.to_path_buf(),
    })?;

    fs::write(path, compressed).await.0.context(IoSnafu {
        path: path.to_path_buf(),
    })?;
    Ok(())
}

/// Reads a snapshot written by [`write`].
pub async fn read(path: &Path) -> Result<Snapshot, StoreError> {
    debug!("Loading snapshot from {}", path.best_effort_path_display());

    let compressed = fs::read(path).await.context(IoSnafu {
        path: path.to_path_buf(),
    })?;
    let encoded = zstd::decode_all(compressed.as_slice()).context(IoSnafu {
        path: path.to_path_buf(),
    })?;
    let (snapshot, _): (Snapshot, usize) =
        bincode::decode_from_slice(&encoded, bincode::config::standard()).context(DecodeSnafu {
            path: path.to_path_buf(),
        })?;

    // Files are not trusted to be sorted
    Ok(Snapshot::from_entries(snapshot))
}

/// Like [`read`], but a missing file yields an empty snapshot.
pub async fn read_or_empty(path: &Path) -> Result<Snapshot, StoreError> {
    match read(path).await {
        Err(StoreError::IoError { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("No stored snapshot found, starting from an empty one");
            Ok(Snapshot::empty())
        }
        other => other,
    }
}

#[derive(Debug, Snafu)]
pub enum StoreError {
    #[snafu(display("Failed to access snapshot file {}", path.best_effort_path_display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to encode snapshot"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("Snapshot file {} is corrupt", path.best_effort_path_display()))]
    DecodeError {
        path: PathBuf,
        source: bincode::error::DecodeError,
    },
}
