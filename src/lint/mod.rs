//! Style checker invocation and report parsing.
//!
//! A checker receives one file's full text and returns violations against
//! it. [`CommandChecker`] feeds the text to an external program on stdin and
//! parses its `<path>:<line>:<column>: <message>` report.

use crate::config::LintConfig;
use crate::error::{GateError, Result};
use crate::model::Violation;
use regex::Regex;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::thread;
use tracing::{debug, warn};

static REPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.*?):(?P<line>\d+):(?:(?P<col>\d+):)?\s?(?P<msg>.*)$")
        .expect("report line pattern is valid")
});

/// Produces style violations for one file.
pub trait StyleChecker {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Check `content`, reporting violations against `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker cannot run or its result is untrustworthy.
    fn check(&self, path: &str, content: &str) -> Result<Vec<Violation>>;
}

/// Runs an external line linter reading from stdin.
#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: String,
    args: Vec<String>,
    ok_exit_codes: Vec<i32>,
}

impl CommandChecker {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ok_exit_codes: vec![0, 1],
        }
    }

    /// Build from configuration, forwarding the ignore list as
    /// `<ignore_flag>=<id,id,...>` ahead of the configured arguments.
    #[must_use]
    pub fn from_config(config: &LintConfig) -> Self {
        let mut args = Vec::with_capacity(config.args.len() + 1);
        if !config.ignore.is_empty() {
            args.push(format!("{}={}", config.ignore_flag, config.ignore.join(",")));
        }
        args.extend(config.args.iter().cloned());

        Self {
            program: config.command.clone(),
            args,
            ok_exit_codes: config.ok_exit_codes.clone(),
        }
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Check that the program can be started.
    ///
    /// # Errors
    ///
    /// Returns `ToolNotFound` if the executable is missing.
    pub fn ensure_available(&self) -> Result<()> {
        self.check("-", "").map(|_| ())
    }

    fn spawn_error(&self, e: std::io::Error) -> GateError {
        if e.kind() == ErrorKind::NotFound {
            GateError::ToolNotFound {
                tool: self.program.clone(),
            }
        } else {
            GateError::Io(e)
        }
    }
}

impl StyleChecker for CommandChecker {
    fn name(&self) -> &str {
        &self.program
    }

    fn check(&self, path: &str, content: &str) -> Result<Vec<Violation>> {
        debug!(path, program = %self.program, args = ?self.args, "Running style checker");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdin = child.stdin.take().ok_or_else(|| GateError::Checker {
            tool: self.program.clone(),
            reason: "failed to capture stdin".to_string(),
        })?;

        // Feed stdin from a second thread so a chatty checker cannot
        // deadlock against a full stdout pipe.
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let mut stdin = stdin;
                match stdin.write_all(content.as_bytes()) {
                    Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            });
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or_else(|_| {
                Err(std::io::Error::other("stdin writer panicked"))
            });
            written.and(output)
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(GateError::Checker {
                tool: self.program.clone(),
                reason: stderr.trim().to_string(),
            });
        }
        match output.status.code() {
            Some(code) if self.ok_exit_codes.contains(&code) => {}
            Some(code) => {
                return Err(GateError::Checker {
                    tool: self.program.clone(),
                    reason: format!("exited with status {code}"),
                });
            }
            None => {
                return Err(GateError::Checker {
                    tool: self.program.clone(),
                    reason: "terminated by signal".to_string(),
                });
            }
        }

        Ok(parse_report(&String::from_utf8_lossy(&output.stdout), path))
    }
}

/// Parse a plain-text checker report.
///
/// Each non-empty line is `<file>:<line>:<column>: <message>` (the column is
/// optional). The file column names whatever the checker called its input,
/// typically `stdin`, and is replaced by `path`. Unparseable lines are
/// skipped with a warning.
#[must_use]
pub fn parse_report(report: &str, path: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    for raw in report.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        let Some(caps) = REPORT_LINE.captures(line) else {
            warn!(path, line, "Skipping unparseable checker output");
            continue;
        };
        let Ok(line_number) = caps["line"].parse::<usize>() else {
            warn!(path, line, "Skipping checker line with out-of-range line number");
            continue;
        };
        let column = caps
            .name("col")
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        violations.push(Violation {
            path: path.to_string(),
            line: line_number,
            column,
            message: caps["msg"].to_string(),
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pycodestyle_report() {
        let report = "stdin:3:1: E302 expected 2 blank lines, found 1\n\
                      stdin:12:80: E501 line too long (88 > 79 characters)\n\n";
        let violations = parse_report(report, "app/views.py");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "app/views.py");
        assert_eq!(violations[0].line, 3);
        assert_eq!(violations[0].column, 1);
        assert_eq!(violations[0].message, "E302 expected 2 blank lines, found 1");
        assert_eq!(violations[1].line, 12);
        assert_eq!(violations[1].column, 80);
    }

    #[test]
    fn column_is_optional() {
        let violations = parse_report("-:7: W391 blank line at end of file", "a.py");
        assert_eq!(violations[0].line, 7);
        assert_eq!(violations[0].column, 0);
        assert_eq!(violations[0].message, "W391 blank line at end of file");
    }

    #[test]
    fn message_may_contain_colons() {
        let violations = parse_report("stdin:2:5: E999 SyntaxError: invalid syntax", "a.py");
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].message, "E999 SyntaxError: invalid syntax");
    }

    #[test]
    fn skips_noise_lines() {
        let violations = parse_report("1 error found\nstdin:1:1: E1 x\n", "a.py");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn empty_report_is_empty() {
        assert!(parse_report("\n", "a.py").is_empty());
        assert!(parse_report("", "a.py").is_empty());
    }

    #[test]
    fn ignore_list_becomes_leading_flag() {
        let config = LintConfig {
            ignore: vec!["E501".to_string(), "W291".to_string()],
            ..LintConfig::default()
        };
        let checker = CommandChecker::from_config(&config);
        assert_eq!(checker.args(), ["--ignore=E501,W291", "-"]);
    }

    #[test]
    fn missing_program_is_tool_not_found() {
        let checker = CommandChecker::new("no-such-style-checker-xyz", vec![]);
        assert!(matches!(
            checker.check("a.py", "x = 1\n"),
            Err(GateError::ToolNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn runs_external_program_over_stdin() {
        let checker = CommandChecker::new(
            "awk",
            vec![r#"/BAD/ { printf "stdin:%d:1: X100 bad token\n", NR }"#.to_string()],
        );
        let violations = checker.check("m.py", "ok\nBAD\nok\nBAD\n").unwrap();
        let lines: Vec<usize> = violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert!(violations.iter().all(|v| v.path == "m.py"));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_output_is_fatal() {
        let checker = CommandChecker::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo boom >&2".to_string()],
        );
        assert!(matches!(
            checker.check("a.py", "x\n"),
            Err(GateError::Checker { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unexpected_exit_status_is_fatal() {
        let checker = CommandChecker::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; exit 3".to_string()],
        );
        let err = checker.check("a.py", "x\n").unwrap_err();
        assert!(err.to_string().contains("exited with status 3"));
    }
}
