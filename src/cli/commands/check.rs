//! Check command: evaluate pushed ref updates.
//!
//! In hook mode git writes one `<old> <new> <ref>` line per updated ref to
//! stdin. Every line is evaluated, and all naming and style violations are
//! reported together so one rejected push lists everything to fix.

use super::CommandContext;
use crate::cli::CheckArgs;
use crate::error::{GateError, Result};
use crate::gate::PushGate;
use crate::lint::{CommandChecker, StyleChecker};
use crate::model::{PushEvent, PushReport, RefOutcome, Violation};
use crate::repo::{GitRepository, RepositoryHistory};
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{debug, info};

/// Execute the check command and return the report for the whole push.
///
/// # Errors
///
/// Returns an error if input is malformed, a tool is missing, or any
/// history or checker query fails.
pub fn execute(args: &CheckArgs, ctx: &CommandContext) -> Result<PushReport> {
    let dir = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = GitRepository::open(&dir);
    repo.ensure_available()?;

    let config = ctx.load_config(Some(&dir))?;
    let checker = CommandChecker::from_config(&config.lint);
    if config.lint.enabled {
        checker.ensure_available()?;
    }

    let events = match &args.event {
        Some(line) => vec![PushEvent::parse(line)?],
        None => read_events(io::stdin().lock())?,
    };
    info!(count = events.len(), trunk = %config.trunk, "Evaluating push");

    let gate = PushGate::new(&repo, checker, config)?;
    let report = evaluate_all(&gate, &events)?;
    render(&report, ctx.json)?;
    Ok(report)
}

/// Evaluate every event in order and combine the outcomes.
///
/// # Errors
///
/// Returns the first evaluation error; a fatal error decides the push.
pub fn evaluate_all<R, C>(gate: &PushGate<R, C>, events: &[PushEvent]) -> Result<PushReport>
where
    R: RepositoryHistory,
    C: StyleChecker,
{
    if events.is_empty() {
        return Err(GateError::malformed("no push events"));
    }

    let mut refs = Vec::with_capacity(events.len());
    for event in events {
        debug!(
            ref_name = %event.ref_name,
            base = %event.base,
            target = %event.target,
            "Evaluating ref update"
        );
        let outcome = gate.evaluate(event)?;
        refs.push(RefOutcome {
            ref_name: event.ref_name.clone(),
            outcome,
        });
    }
    Ok(PushReport::from_outcomes(refs))
}

/// Parse hook input, one event per non-blank line.
///
/// # Errors
///
/// Returns `MalformedInput` for a bad line or when no line is present.
pub fn read_events<B: BufRead>(input: B) -> Result<Vec<PushEvent>> {
    let mut events = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(PushEvent::parse(&line)?);
    }
    if events.is_empty() {
        return Err(GateError::malformed("no push event on stdin"));
    }
    Ok(events)
}

fn render(report: &PushReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if let Some(text) = render_text(report) {
        print!("{text}");
    }
    Ok(())
}

/// Human-readable report for a rejected push, `None` when accepted.
#[must_use]
pub fn render_text(report: &PushReport) -> Option<String> {
    if report.is_accepted() {
        return None;
    }

    let mut out = String::new();
    for (branch, pattern) in report.naming_violations() {
        out.push_str(&format!(
            "Branch name '{branch}' does not follow the naming convention.\n\
             Names must match: {pattern}\n"
        ));
    }
    if !report.violations.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&render_violations(&report.violations));
    }
    Some(out)
}

fn render_violations(violations: &[Violation]) -> String {
    let mut by_file: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
    for violation in violations {
        by_file.entry(violation.path.as_str()).or_default().push(violation);
    }

    let mut out = String::from("Style violations introduced by this push:\n");
    for (path, items) in &by_file {
        out.push('\n');
        for violation in items {
            out.push_str(&format!("{violation}\n"));
        }
        debug!(path, count = items.len(), "Reported violations");
    }
    out.push_str(&format!(
        "\n{} violation(s) in {} file(s). Fix the lines above and push again.\n",
        violations.len(),
        by_file.len()
    ));
    out
}
