//! Suppression of violations on lines the push did not touch.

use crate::diff::NewLines;
use crate::model::Violation;

/// Keep the violations whose line is one of `new_lines`.
///
/// Both sides use 1-indexed line numbers of the new file.
#[must_use]
pub fn filter_violations<I>(violations: I, new_lines: &NewLines) -> Vec<Violation>
where
    I: IntoIterator<Item = Violation>,
{
    violations
        .into_iter()
        .filter(|v| new_lines.contains(&v.line))
        .collect()
}
