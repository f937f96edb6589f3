//! Error types and handling for `push_gate`.
//!
//! Only fatal conditions live here. A push rejected for a naming or style
//! violation is a normal [`GateOutcome`](crate::model::GateOutcome), not an
//! error; the binary maps both into exit codes at the outermost boundary.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps `anyhow` for ad-hoc context from helpers
//! - Provides operator-facing hints
//! - Exit codes are grouped by category in [`ErrorCode`]

mod structured;

pub use structured::{ErrorCode, StructuredError};

use thiserror::Error;

/// Primary error type for `push_gate` operations.
#[derive(Error, Debug)]
pub enum GateError {
    // === Environment Errors ===
    /// A required external program could not be started.
    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    // === Input Errors ===
    /// The push event line did not contain exactly three tokens.
    #[error("Malformed push event: {reason}")]
    MalformedInput { reason: String },

    // === History Errors ===
    /// Trunk and target share no history.
    #[error("No common ancestor between '{trunk}' and '{target}'")]
    NoCommonAncestor { trunk: String, target: String },

    /// A git subprocess failed.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    // === Checker Errors ===
    /// The style checker ran but its result cannot be trusted.
    #[error("Style checker '{tool}' failed: {reason}")]
    Checker { tool: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A branch naming pattern does not compile.
    #[error("Invalid branch pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === I/O Errors ===
    /// File system or pipe I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    /// Can the pusher or operator fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::MalformedInput { .. }
                | Self::NoCommonAncestor { .. }
                | Self::Config(_)
                | Self::InvalidPattern { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotFound { .. } => {
                Some("Install the tool on the server or point lint.command at it")
            }
            Self::MalformedInput { .. } => {
                Some("Expected one line: <old-revision> <new-revision> <ref-name>")
            }
            Self::NoCommonAncestor { .. } => {
                Some("Rebase the branch onto the trunk before pushing")
            }
            Self::InvalidPattern { .. } => Some("Fix branch.prefixes in push-gate.yaml"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        StructuredError::from_error(self).code.exit_code()
    }

    /// Create a git failure from a command line and captured stderr.
    #[must_use]
    pub fn git(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Git {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a malformed-input error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}

/// Result type using `GateError`.
pub type Result<T> = std::result::Result<T, GateError>;
