//! Command implementations.
//!
//! Each command loads its configuration, does its work and prints its own
//! output. Exit statuses are decided in `main`.

pub mod branch;
pub mod check;
pub mod completions;
pub mod config;
pub mod new_lines;
pub mod version;

use crate::config::{CliOverrides, ConfigSources, GateConfig, load_config};
use crate::error::Result;
use crate::repo::GitRepository;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global options every command sees.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub json: bool,
    pub config_path: Option<PathBuf>,
    pub overrides: CliOverrides,
}

impl CommandContext {
    /// Load configuration, including `<git_dir>/push-gate.yaml` when `repo_dir`
    /// is inside a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if a config source cannot be read or is invalid.
    pub fn load_config(&self, repo_dir: Option<&Path>) -> Result<GateConfig> {
        let git_dir = repo_dir.and_then(|dir| {
            GitRepository::open(dir)
                .git_dir()
                .inspect_err(|e| debug!(error = %e, "No repository config available"))
                .ok()
        });
        let sources = ConfigSources {
            git_dir,
            explicit: self.config_path.clone(),
        };
        load_config(&sources, &self.overrides)
    }
}
