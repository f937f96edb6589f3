//! `RepositoryHistory` backed by the `git` executable.

use super::RepositoryHistory;
use crate::error::{GateError, Result};
use crate::model::{FileChange, FileStatus, Revision};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Runs git plumbing commands inside one repository (bare or not).
#[derive(Debug, Clone)]
pub struct GitRepository {
    dir: PathBuf,
    program: String,
}

impl GitRepository {
    /// Use the repository at `dir` (a hook's working directory is the
    /// repository itself).
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            program: "git".to_string(),
        }
    }

    /// Override the git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check that git can be started at all.
    ///
    /// # Errors
    ///
    /// Returns `ToolNotFound` if the executable is missing.
    pub fn ensure_available(&self) -> Result<()> {
        self.run(&["--version"]).map(|_| ())
    }

    /// Resolve the git directory (`$GIT_DIR` for hooks).
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not inside a repository.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let out = self.stdout(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(out.trim()))
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(dir = %self.dir.display(), "git {}", args.join(" "));
        Command::new(&self.program)
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    GateError::ToolNotFound {
                        tool: self.program.clone(),
                    }
                } else {
                    GateError::Io(e)
                }
            })
    }

    /// Run git and return stdout. A failing status or any stderr output
    /// is an error: git reports degraded results (such as skipped rename
    /// detection) as warnings on a successful exit.
    fn stdout(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || !stderr.trim().is_empty() {
            return Err(GateError::git(args.join(" "), stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RepositoryHistory for GitRepository {
    fn merge_bases(&self, trunk: &str, target: &Revision) -> Result<Vec<Revision>> {
        let args = ["merge-base", "--all", trunk, target.as_str()];
        let output = self.run(&args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Exit status 1 with no output means "no common ancestor".
        if !output.status.success() {
            let silent = stdout.trim().is_empty() && stderr.trim().is_empty();
            if output.status.code() == Some(1) && silent {
                return Ok(Vec::new());
            }
            return Err(GateError::git(args.join(" "), stderr.trim()));
        }
        if !stderr.trim().is_empty() {
            return Err(GateError::git(args.join(" "), stderr.trim()));
        }

        Ok(parse_merge_bases(&stdout))
    }

    fn changed_paths(&self, base: &Revision, target: &Revision) -> Result<Vec<FileChange>> {
        let out = self.stdout(&[
            "diff-tree",
            "-r",
            "-z",
            "--name-status",
            "-M",
            base.as_str(),
            target.as_str(),
        ])?;
        parse_name_status_z(&out)
    }

    fn read_file(&self, path: &str, revision: &Revision) -> Result<Option<String>> {
        let listing = self.stdout(&[
            "ls-tree",
            "-z",
            "--full-tree",
            revision.as_str(),
            "--",
            path,
        ])?;
        if listing.trim_matches('\0').is_empty() {
            return Ok(None);
        }

        let spec = format!("{revision}:{path}");
        self.stdout(&["cat-file", "blob", &spec]).map(Some)
    }
}

fn parse_merge_bases(stdout: &str) -> Vec<Revision> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Revision::new)
        .collect()
}

/// Parse `git diff-tree --name-status -z` output.
///
/// Records are `<status>\0<path>\0`, except renames and copies which carry
/// `<status>\0<old>\0<new>\0`; those report the new path.
fn parse_name_status_z(out: &str) -> Result<Vec<FileChange>> {
    let mut fields = out.split('\0').filter(|f| !f.is_empty());
    let mut changes = Vec::new();

    while let Some(code) = fields.next() {
        let status = FileStatus::from_git_code(code);
        let two_paths = code.starts_with('R') || code.starts_with('C');
        let Some(mut path) = fields.next() else {
            return Err(GateError::git(
                "diff-tree --name-status",
                format!("missing path after status '{code}'"),
            ));
        };
        if two_paths {
            path = fields.next().ok_or_else(|| {
                GateError::git(
                    "diff-tree --name-status",
                    format!("missing destination path for '{code}'"),
                )
            })?;
        }
        changes.push(FileChange::new(path, status));
    }

    Ok(changes)
}
