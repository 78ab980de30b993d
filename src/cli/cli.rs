use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Track structural changes between build passes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The project directory holding strata.yaml
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Show size, mode and mtime next to each printed operation
    #[clap(long, global = true)]
    pub long: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a snapshot of a directory tree into a file
    Snapshot {
        tree: PathBuf,
        #[clap(long, short)]
        out: PathBuf,
    },
    /// Print the operations that turn one tree into another. Each side is a
    /// directory or a snapshot file
    Diff { previous: PathBuf, next: PathBuf },
    /// Print what changed in the configured input root since the last run
    Changes {
        /// Snapshot file to compare against and update
        #[clap(long)]
        state: Option<PathBuf>,
    },
}
