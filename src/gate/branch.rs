//! Branch naming convention.
//!
//! The accepted names are an alternation of configured prefix patterns plus
//! the built-in release and maintenance conventions. Matching uses the
//! `regex` crate, which runs in time linear in the branch name, so no
//! configured pattern can make the check hang.

use crate::error::{GateError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Release branches, e.g. `release-2.4` or `release/2024.10`.
pub const RELEASE_CONVENTION: &str = r"release[-_/][0-9A-Za-z._-]+";
/// Maintenance branches, e.g. `hotfix/login-crash`.
pub const MAINTENANCE_CONVENTION: &str = r"(?:maint|maintenance|hotfix)[-_/][0-9A-Za-z._-]+";

/// Compiled program size cap for the composed pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Where a pattern has to match inside the branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Anywhere in the name (`JIRA-1` accepts `wip-JIRA-1`).
    #[default]
    Anywhere,
    /// At the start of the name.
    Start,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anywhere => "anywhere",
            Self::Start => "start",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anywhere" | "search" => Ok(Self::Anywhere),
            "start" | "prefix" | "anchored" => Ok(Self::Start),
            other => Err(GateError::Config(format!(
                "invalid branch.match '{other}' (expected 'anywhere' or 'start')"
            ))),
        }
    }
}

/// The compiled naming convention for new branches.
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    regex: Option<Regex>,
    mode: MatchMode,
}

impl BranchPolicy {
    /// Compose and compile the convention.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` naming the first prefix that does not
    /// compile, or the composed pattern if it exceeds the size limit.
    pub fn compile(prefixes: &[String], builtin_conventions: bool, mode: MatchMode) -> Result<Self> {
        let mut alternatives = Vec::with_capacity(prefixes.len() + 2);
        for prefix in prefixes.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            compile_bounded(prefix)?;
            alternatives.push(prefix.to_string());
        }
        if builtin_conventions {
            alternatives.push(RELEASE_CONVENTION.to_string());
            alternatives.push(MAINTENANCE_CONVENTION.to_string());
        }

        if alternatives.is_empty() {
            warn!("No branch naming conventions configured; new branch names are not checked");
            return Ok(Self { regex: None, mode });
        }

        let joined = alternatives
            .iter()
            .map(|alt| format!("(?:{alt})"))
            .collect::<Vec<_>>()
            .join("|");
        let composed = match mode {
            MatchMode::Anywhere => joined,
            MatchMode::Start => format!("^(?:{joined})"),
        };
        debug!(pattern = %composed, "Compiled branch naming convention");

        Ok(Self {
            regex: Some(compile_bounded(&composed)?),
            mode,
        })
    }

    /// True if no convention is configured at all.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.regex.is_none()
    }

    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The composed pattern, or an empty string when disabled.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_ref().map_or("", Regex::as_str)
    }

    /// True if `name` follows the convention.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().is_none_or(|re| re.is_match(name))
    }
}

/// True if `name` follows `policy`. Only meaningful for newly created branches.
#[must_use]
pub fn check_branch_name(name: &str, policy: &BranchPolicy) -> bool {
    policy.matches(name)
}

fn compile_bounded(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| GateError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(prefixes: &[&str], builtin: bool, mode: MatchMode) -> BranchPolicy {
        let prefixes: Vec<String> = prefixes.iter().map(ToString::to_string).collect();
        BranchPolicy::compile(&prefixes, builtin, mode).unwrap()
    }

    #[test]
    fn configured_prefix_matches() {
        let p = policy(&[r"JIRA-\d+"], true, MatchMode::Anywhere);
        assert!(check_branch_name("JIRA-123", &p));
        assert!(!check_branch_name("my-feature", &p));
    }

    #[test]
    fn builtin_conventions() {
        let p = policy(&[], true, MatchMode::Anywhere);
        assert!(p.matches("release-2.4"));
        assert!(p.matches("release/2024.10"));
        assert!(p.matches("hotfix/login-crash"));
        assert!(p.matches("maint_1.x"));
        assert!(!p.matches("release"));
        assert!(!p.matches("feature/login"));
    }

    #[test]
    fn builtins_can_be_disabled() {
        let p = policy(&[r"OPS-\d+"], false, MatchMode::Anywhere);
        assert!(!p.matches("release-1.0"));
        assert!(p.matches("OPS-7"));
    }

    #[test]
    fn anywhere_mode_matches_inside_name() {
        let p = policy(&[r"JIRA-\d+"], false, MatchMode::Anywhere);
        assert!(p.matches("wip-JIRA-12-login"));
    }

    #[test]
    fn start_mode_anchors_every_alternative() {
        let p = policy(&[r"JIRA-\d+", r"OPS-\d+"], false, MatchMode::Start);
        assert!(p.matches("JIRA-12-login"));
        assert!(p.matches("OPS-3"));
        assert!(!p.matches("wip-JIRA-12"));
        assert!(!p.matches("wip-OPS-3"));
    }

    #[test]
    fn alternation_inside_prefix_stays_grouped() {
        let p = policy(&["ABC|DEF-1"], false, MatchMode::Start);
        assert!(p.matches("ABC-9"));
        assert!(p.matches("DEF-1"));
        assert!(!p.matches("x-DEF-1"));
    }

    #[test]
    fn invalid_prefix_is_reported_by_name() {
        let err = BranchPolicy::compile(&["JIRA-(".to_string()], true, MatchMode::Anywhere)
            .unwrap_err();
        match err {
            GateError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "JIRA-("),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_conventions_disables_gate() {
        let p = policy(&["  "], false, MatchMode::Anywhere);
        assert!(p.is_disabled());
        assert!(p.matches("anything"));
        assert_eq!(p.pattern(), "");
    }

    #[test]
    fn match_mode_parsing() {
        assert_eq!("START".parse::<MatchMode>().unwrap(), MatchMode::Start);
        assert_eq!("anywhere".parse::<MatchMode>().unwrap(), MatchMode::Anywhere);
        assert!("full".parse::<MatchMode>().is_err());
    }
}
