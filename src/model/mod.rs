//! Core data types for `push_gate`.
//!
//! This module defines the invocation-scoped types the gate works with:
//! - `Revision` - An opaque commit identifier, including the null revision
//! - `PushEvent` - One ref update read from the hook's stdin
//! - `FileChange` / `ChangeSet` - Touched paths between two revisions
//! - `Violation` - One style checker finding
//! - `GateOutcome` - The accept/reject decision for one ref update
//! - `PushReport` - The combined decision for every ref in a push

use crate::error::{ErrorCode, GateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Namespace prefix for branch refs.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// An opaque identifier for a commit-like snapshot.
///
/// git reports a missing side of a ref update as an all-zero object name
/// (40 digits for SHA-1 repositories, 64 for SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// The all-zero SHA-1 object name git uses for "does not exist".
    pub const NULL_SHA1: &'static str = "0000000000000000000000000000000000000000";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null revision.
    #[must_use]
    pub fn null() -> Self {
        Self(Self::NULL_SHA1.to_string())
    }

    /// True if this revision is the "does not exist" marker.
    #[must_use]
    pub fn is_null(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b == b'0')
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of ref a push updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind<'a> {
    /// `refs/heads/<name>`
    Branch(&'a str),
    /// Tags, notes and anything else outside `refs/heads/`.
    Other(&'a str),
}

/// One ref update: `<old> <new> <ref>` as delivered on the hook's stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub base: Revision,
    pub target: Revision,
    pub ref_name: String,
}

impl PushEvent {
    /// Parse a push event line.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` unless the line holds exactly three
    /// whitespace-separated tokens.
    pub fn parse(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [base, target, ref_name] = tokens.as_slice() else {
            return Err(GateError::malformed(format!(
                "expected 3 tokens, got {}",
                tokens.len()
            )));
        };

        Ok(Self {
            base: Revision::new(*base),
            target: Revision::new(*target),
            ref_name: (*ref_name).to_string(),
        })
    }

    #[must_use]
    pub fn ref_kind(&self) -> RefKind<'_> {
        self.ref_name
            .strip_prefix(BRANCH_REF_PREFIX)
            .map_or(RefKind::Other(&self.ref_name), RefKind::Branch)
    }

    /// Branch name with the `refs/heads/` namespace stripped.
    #[must_use]
    pub fn branch_name(&self) -> Option<&str> {
        match self.ref_kind() {
            RefKind::Branch(name) => Some(name),
            RefKind::Other(_) => None,
        }
    }

    #[must_use]
    pub fn is_new_branch(&self) -> bool {
        self.base.is_null()
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.target.is_null()
    }
}

impl FromStr for PushEvent {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Status of a path between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    /// Renamed, copied, type-changed, unmerged, broken pairs.
    Other,
}

impl FileStatus {
    /// Classify a `git diff --name-status` status column.
    #[must_use]
    pub fn from_git_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => Self::Added,
            Some('M') => Self::Modified,
            Some('D') => Self::Deleted,
            _ => Self::Other,
        }
    }
}

/// A touched path and how it was touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
}

impl FileChange {
    #[must_use]
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// Added and modified paths between the effective base and the target.
///
/// A path appears in at most one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len()
    }

    /// Every carried path with its status, added files first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FileStatus)> {
        self.added
            .iter()
            .map(|p| (p.as_str(), FileStatus::Added))
            .chain(self.modified.iter().map(|p| (p.as_str(), FileStatus::Modified)))
    }
}

/// One finding reported by the style checker against the new content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    /// 1-indexed line in the new file.
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path, self.line, self.column, self.message
        )
    }
}

/// Why a push was let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum AcceptReason {
    BranchDeleted,
    TrunkPush,
    NonBranchRef,
    Clean { files_checked: usize },
}

/// The decision for one ref update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GateOutcome {
    Accepted(AcceptReason),
    NamingViolation { branch: String, pattern: String },
    StyleViolation { violations: Vec<Violation> },
}

impl GateOutcome {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The rejection code, if any.
    #[must_use]
    pub const fn rejection_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Accepted(_) => None,
            Self::NamingViolation { .. } => Some(ErrorCode::NamingViolation),
            Self::StyleViolation { .. } => Some(ErrorCode::StyleViolation),
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.rejection_code() {
            Some(code) => code.exit_code(),
            None => 0,
        }
    }
}

/// Outcome of one ref update within a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOutcome {
    pub ref_name: String,
    pub outcome: GateOutcome,
}

/// Overall verdict for a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushDecision {
    Accepted,
    NamingViolation,
    StyleViolation,
}

/// The decision for a whole push, built from every ref update in it.
///
/// Naming violations outrank style violations. Style violations from all
/// refs are merged and de-duplicated, keeping first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReport {
    pub decision: PushDecision,
    pub refs: Vec<RefOutcome>,
    pub violations: Vec<Violation>,
}

impl PushReport {
    #[must_use]
    pub fn from_outcomes(refs: Vec<RefOutcome>) -> Self {
        let mut seen = HashSet::new();
        let mut violations = Vec::new();
        let mut naming = false;
        for item in &refs {
            match &item.outcome {
                GateOutcome::NamingViolation { .. } => naming = true,
                GateOutcome::StyleViolation { violations: found } => {
                    for violation in found {
                        if seen.insert(violation) {
                            violations.push(violation.clone());
                        }
                    }
                }
                GateOutcome::Accepted(_) => {}
            }
        }

        let decision = if naming {
            PushDecision::NamingViolation
        } else if refs.iter().any(|r| matches!(r.outcome, GateOutcome::StyleViolation { .. })) {
            PushDecision::StyleViolation
        } else {
            PushDecision::Accepted
        };

        Self {
            decision,
            refs,
            violations,
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.decision, PushDecision::Accepted)
    }

    /// Naming rejections as `(branch, pattern)` pairs.
    pub fn naming_violations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.refs.iter().filter_map(|r| match &r.outcome {
            GateOutcome::NamingViolation { branch, pattern } => {
                Some((branch.as_str(), pattern.as_str()))
            }
            _ => None,
        })
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.decision {
            PushDecision::Accepted => 0,
            PushDecision::NamingViolation => ErrorCode::NamingViolation.exit_code(),
            PushDecision::StyleViolation => ErrorCode::StyleViolation.exit_code(),
        }
    }
}
