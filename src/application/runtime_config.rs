use std::path::PathBuf;

use crate::cli::{Cli, Command};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    pub root: PathBuf,
    pub long: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            root: cli.root,
            long: cli.long,
        }
    }
}
