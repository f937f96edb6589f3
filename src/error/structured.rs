//! Structured error output for hook diagnostics.
//!
//! Provides machine-parseable error information with:
//! - Stable error codes for categorization
//! - Hints for the pusher or the server operator
//! - Context for debugging
//!
//! Rejection outcomes share the same code space so that every non-zero exit
//! status of the binary is described by exactly one [`ErrorCode`].

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used by wrapping scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Rejections (exit codes 2-3) ===
    /// New branch name does not follow the naming convention
    NamingViolation,
    /// New or changed lines violate the style checker
    StyleViolation,

    // === Environment (exit code 4) ===
    /// Required external program missing
    ToolNotFound,

    // === Input (exit code 5) ===
    /// Push event line could not be parsed
    MalformedInput,

    // === History (exit code 6) ===
    /// Trunk and target have no merge-base
    NoCommonAncestor,

    // === Config (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Branch pattern does not compile
    InvalidPattern,
    /// YAML parsing error
    YamlError,

    // === External failures (exit code 8) ===
    /// git subprocess failed
    GitError,
    /// Style checker failed
    CheckerError,
    /// File or pipe I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Internal (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NamingViolation => "NAMING_VIOLATION",
            Self::StyleViolation => "STYLE_VIOLATION",
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::MalformedInput => "MALFORMED_INPUT",
            Self::NoCommonAncestor => "NO_COMMON_ANCESTOR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::YamlError => "YAML_ERROR",
            Self::GitError => "GIT_ERROR",
            Self::CheckerError => "CHECKER_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the exit code for this category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Branch naming violation
    /// - 3: Style violation on new lines
    /// - 4: Required external tool missing
    /// - 5: Malformed push input
    /// - 6: No common ancestor with trunk
    /// - 7: Config errors
    /// - 8: git, checker and I/O failures
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NamingViolation => 2,
            Self::StyleViolation => 3,
            Self::ToolNotFound => 4,
            Self::MalformedInput => 5,
            Self::NoCommonAncestor => 6,
            Self::ConfigError | Self::InvalidPattern | Self::YamlError => 7,
            Self::GitError | Self::CheckerError | Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `GateError`.
    #[must_use]
    pub fn from_error(err: &GateError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &GateError) -> (ErrorCode, Option<Value>) {
        match err {
            GateError::ToolNotFound { tool } => {
                (ErrorCode::ToolNotFound, Some(json!({"tool": tool})))
            }
            GateError::MalformedInput { reason } => {
                (ErrorCode::MalformedInput, Some(json!({"reason": reason})))
            }
            GateError::NoCommonAncestor { trunk, target } => (
                ErrorCode::NoCommonAncestor,
                Some(json!({"trunk": trunk, "target": target})),
            ),
            GateError::Git { command, stderr } => (
                ErrorCode::GitError,
                Some(json!({"command": command, "stderr": stderr})),
            ),
            GateError::Checker { tool, reason } => (
                ErrorCode::CheckerError,
                Some(json!({"tool": tool, "reason": reason})),
            ),
            GateError::Config(_) => (ErrorCode::ConfigError, None),
            GateError::InvalidPattern { pattern, reason } => (
                ErrorCode::InvalidPattern,
                Some(json!({"pattern": pattern, "reason": reason})),
            ),
            GateError::Io(_) => (ErrorCode::IoError, None),
            GateError::Json(_) => (ErrorCode::JsonError, None),
            GateError::Yaml(_) => (ErrorCode::YamlError, None),
            GateError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
