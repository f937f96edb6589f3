#![allow(dead_code)]

use push_gate::Result;
use push_gate::lint::StyleChecker;
use push_gate::model::Violation;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;
use tempfile::TempDir;

pub mod cli;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        push_gate::logging::init_test_logging();
    });
}

/// Reports every line containing `marker`, like a linter with one rule.
pub struct MarkerChecker {
    pub marker: &'static str,
}

impl StyleChecker for MarkerChecker {
    fn name(&self) -> &str {
        "marker"
    }

    fn check(&self, path: &str, content: &str) -> Result<Vec<Violation>> {
        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(self.marker))
            .map(|(idx, _)| Violation {
                path: path.to_string(),
                line: idx + 1,
                column: 1,
                message: format!("X100 found {}", self.marker),
            })
            .collect())
    }
}

/// A throwaway git repository with `master` as the initial branch.
pub struct GitFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl GitFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let fixture = Self { temp_dir, root };
        fixture.git(&["init", "-q", "-b", "master"]);
        fixture.git(&["config", "user.email", "gate@example.com"]);
        fixture.git(&["config", "user.name", "Gate Test"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture
    }

    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        std::fs::write(full, content).expect("write file");
    }

    /// Commit everything in the worktree and return the new revision.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

pub fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}
