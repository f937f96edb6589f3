//! Push evaluation.
//!
//! [`PushGate::evaluate`] decides one ref update:
//!
//! 1. Deletions, non-branch refs and trunk pushes are accepted outright.
//! 2. A newly created branch must follow the naming convention.
//! 3. Every added or modified file between the effective base and the target
//!    is run through the style checker, and only violations on lines the push
//!    introduced are kept.

pub mod branch;
pub mod changes;
pub mod filter;
pub mod resolve;

pub use branch::{BranchPolicy, MatchMode, check_branch_name};
pub use changes::extract_changes;
pub use filter::filter_violations;
pub use resolve::resolve_effective_base;

use crate::config::GateConfig;
use crate::diff::new_lines_between;
use crate::error::{GateError, Result};
use crate::lint::StyleChecker;
use crate::model::{AcceptReason, FileStatus, GateOutcome, PushEvent, RefKind, Revision, Violation};
use crate::repo::RepositoryHistory;
use tracing::{debug, info};

/// Evaluates push events against one repository and configuration.
pub struct PushGate<R, C> {
    repo: R,
    checker: C,
    config: GateConfig,
    policy: BranchPolicy,
}

impl<R: RepositoryHistory, C: StyleChecker> PushGate<R, C> {
    /// Build a gate, compiling the branch naming convention up front.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if a configured branch prefix does not compile.
    pub fn new(repo: R, checker: C, config: GateConfig) -> Result<Self> {
        let policy = BranchPolicy::compile(
            &config.branch.prefixes,
            config.branch.builtin_conventions,
            config.branch.match_mode,
        )?;
        Ok(Self {
            repo,
            checker,
            config,
            policy,
        })
    }

    #[must_use]
    pub const fn policy(&self) -> &BranchPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decide whether `event` may be applied.
    ///
    /// # Errors
    ///
    /// Returns an error when the decision cannot be made: history queries
    /// fail, the histories are unrelated, or the checker misbehaves. Policy
    /// rejections are outcomes, not errors.
    pub fn evaluate(&self, event: &PushEvent) -> Result<GateOutcome> {
        if event.is_deletion() {
            info!(ref_name = %event.ref_name, "Accepting ref deletion");
            return Ok(GateOutcome::Accepted(AcceptReason::BranchDeleted));
        }

        let branch = match event.ref_kind() {
            RefKind::Branch(name) => name,
            RefKind::Other(name) => {
                info!(ref_name = name, "Accepting non-branch ref");
                return Ok(GateOutcome::Accepted(AcceptReason::NonBranchRef));
            }
        };

        if branch == self.config.trunk {
            info!(branch, "Accepting push to trunk");
            return Ok(GateOutcome::Accepted(AcceptReason::TrunkPush));
        }

        if event.is_new_branch() && !check_branch_name(branch, &self.policy) {
            info!(branch, pattern = self.policy.pattern(), "Rejecting branch name");
            return Ok(GateOutcome::NamingViolation {
                branch: branch.to_string(),
                pattern: self.policy.pattern().to_string(),
            });
        }

        if !self.config.lint.enabled {
            debug!(branch, "Style check disabled");
            return Ok(GateOutcome::Accepted(AcceptReason::Clean { files_checked: 0 }));
        }

        let base =
            resolve_effective_base(&self.repo, &event.base, &event.target, &self.config.trunk)?;
        let change_set = extract_changes(&self.repo, &base, &event.target)?;

        let mut violations = Vec::new();
        let mut files_checked = 0;
        for (path, status) in change_set.iter() {
            if !self.config.lint.applies_to(path) {
                debug!(path, "Skipping path outside checked extensions");
                continue;
            }
            violations.extend(self.check_file(path, status, &base, &event.target)?);
            files_checked += 1;
        }

        if violations.is_empty() {
            info!(branch, files_checked, "Push is clean");
            Ok(GateOutcome::Accepted(AcceptReason::Clean { files_checked }))
        } else {
            info!(branch, count = violations.len(), "Rejecting push with style violations");
            Ok(GateOutcome::StyleViolation { violations })
        }
    }

    /// Violations on lines of `path` that are new at `target` relative to `base`.
    fn check_file(
        &self,
        path: &str,
        status: FileStatus,
        base: &Revision,
        target: &Revision,
    ) -> Result<Vec<Violation>> {
        let new_text = self.repo.read_file(path, target)?.ok_or_else(|| {
            GateError::git(
                format!("read {target}:{path}"),
                "path listed as changed but missing at target",
            )
        })?;
        let old_text = match status {
            FileStatus::Modified => self.repo.read_file(path, base)?,
            _ => None,
        };

        let new_lines = new_lines_between(
            old_text.as_deref(),
            &new_text,
            self.config.diff.max_cells,
        );
        if new_lines.is_empty() {
            debug!(path, "No new lines; skipping checker");
            return Ok(Vec::new());
        }

        let report = self.checker.check(path, &new_text)?;
        let kept = filter_violations(report, &new_lines);
        debug!(path, new_lines = new_lines.len(), kept = kept.len(), "Checked file");
        Ok(kept)
    }
}
