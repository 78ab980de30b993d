use std::path::{Path, PathBuf};

use snafu::prelude::*;
use strata::snapshot::store::{self, StoreError};
use strata::{BestEffortPathExt, Patch, Snapshot, WalkError, calculate_patch, walk};
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::report::{configure_color, print_patch};
use crate::cli::Command;
use crate::config::{Config, ConfigError};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        debug!("Running {:?}", runtime_config.command);
        configure_color();

        match runtime_config.command {
            Command::Snapshot { tree, out } => {
                let snapshot = Self::walk_tree(&tree)?;
                store::write(&out, &snapshot).await.context(StoreSnafu)?;
                info!(
                    "Stored {} entries at {}",
                    snapshot.len(),
                    out.best_effort_path_display()
                );
            }
            Command::Diff { previous, next } => {
                let previous = Self::load(&previous).await?;
                let next = Self::load(&next).await?;
                print_patch(&calculate_patch(&previous, &next), runtime_config.long);
            }
            Command::Changes { state } => {
                let config = Config::read(&runtime_config.root)
                    .await
                    .context(ConfigSnafu)?;
                debug!("Loaded config: {:?}", config);
                let state = state.unwrap_or_else(|| config.state.clone());
                print_patch(
                    &Self::changes(&config.input, &state).await?,
                    runtime_config.long,
                );
            }
        }

        Ok(())
    }

    /// Diffs `input` against the snapshot stored at `state`, then replaces
    /// the stored snapshot with the current one.
    pub async fn changes(input: &Path, state: &Path) -> Result<Patch, ApplicationError> {
        let previous = store::read_or_empty(state).await.context(StoreSnafu)?;
        let next = Self::walk_tree(input)?;
        let patch = calculate_patch(&previous, &next);

        store::write(state, &next).await.context(StoreSnafu)?;
        info!("{} changed by {} operations", input.best_effort_path_display(), patch.len());
        Ok(patch)
    }

    /// A directory is walked, anything else is read as a snapshot file.
    async fn load(path: &Path) -> Result<Snapshot, ApplicationError> {
        if path.is_dir() {
            Self::walk_tree(path)
        } else {
            store::read(path).await.context(StoreSnafu)
        }
    }

    fn walk_tree(tree: &Path) -> Result<Snapshot, ApplicationError> {
        walk(tree).context(WalkSnafu {
            tree: PathBuf::from(tree),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Failed to snapshot {}", tree.best_effort_path_display()))]
    WalkError { tree: PathBuf, source: WalkError },
    #[snafu(display("Failed to access a stored snapshot"))]
    StoreError { source: StoreError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata::Operation;
    use tempfile::TempDir;

    #[compio::test]
    async fn changes_are_reported_once() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let input = root.path().join("input");
        let state = root.path().join(".strata/input.snapshot");
        std::fs::create_dir_all(input.join("bro")).expect("Failed to create input");
        std::fs::write(input.join("bro/apple.txt"), "apple").expect("Failed to write");

        let first = Application::changes(&input, &state)
            .await
            .expect("Failed to compute changes");
        let operations = first
            .iter()
            .map(|op| (op.operation(), op.relative_path().as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            operations,
            vec![(Operation::Mkdir, "bro"), (Operation::Create, "bro/apple.txt")]
        );

        let second = Application::changes(&input, &state)
            .await
            .expect("Failed to compute changes");
        assert!(second.is_empty());
    }

    #[compio::test]
    async fn changes_fail_for_missing_input() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let state = root.path().join("state.snapshot");

        let result = Application::changes(&root.path().join("missing"), &state).await;

        assert!(matches!(result, Err(ApplicationError::WalkError { .. })));
        assert!(!state.exists());
    }

    #[compio::test]
    async fn snapshot_then_diff_against_a_directory() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let tree = root.path().join("tree");
        let file = root.path().join("tree.snapshot");
        std::fs::create_dir_all(&tree).expect("Failed to create tree");
        std::fs::write(tree.join("old.txt"), "old").expect("Failed to write");

        Application::run(RuntimeConfig {
            command: Command::Snapshot {
                tree: tree.clone(),
                out: file.clone(),
            },
            root: root.path().to_path_buf(),
            long: false,
        })
        .await
        .expect("Failed to store snapshot");

        std::fs::remove_file(tree.join("old.txt")).expect("Failed to remove");
        let previous = Application::load(&file).await.expect("Failed to load file");
        let next = Application::load(&tree).await.expect("Failed to walk tree");

        let patch = calculate_patch(&previous, &next);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch[0].operation(), Operation::Unlink);
    }
}
