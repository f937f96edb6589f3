//! Classification of new-file lines as new or carried over.
//!
//! Line numbers are 1-indexed in the new file's coordinate space, the same
//! numbering a style checker uses when it is fed the new content.

use super::{DiffOp, EditScript, edit_script_with_limit};
use std::collections::BTreeSet;
use tracing::warn;

/// 1-indexed line numbers of the new file that did not exist in the old one.
pub type NewLines = BTreeSet<usize>;

/// Project an edit script onto the new file's line numbers.
///
/// Matches and inserts advance the new-file counter; deletes have no
/// position in the new file and leave it alone. Only inserts are recorded.
#[must_use]
pub fn classify(script: &EditScript) -> NewLines {
    let mut counter = 0usize;
    let mut new_lines = NewLines::new();

    for op in &script.ops {
        match op {
            DiffOp::Match { .. } => counter += 1,
            DiffOp::Insert { new } => {
                counter += 1;
                debug_assert_eq!(*new + 1, counter);
                new_lines.insert(counter);
            }
            DiffOp::Delete { .. } => {}
        }
    }

    new_lines
}

/// Align two line sequences and return the new line numbers.
#[must_use]
pub fn align_and_classify<T: PartialEq>(old_lines: &[T], new_lines: &[T]) -> NewLines {
    classify(&super::edit_script(old_lines, new_lines))
}

/// Classify whole file texts. `old` is `None` when the file did not exist
/// at the base revision, which makes every line new.
#[must_use]
pub fn new_lines_between(old: Option<&str>, new: &str, max_cells: usize) -> NewLines {
    let old_lines: Vec<&str> = old.map(|text| text.lines().collect()).unwrap_or_default();
    let new_lines: Vec<&str> = new.lines().collect();

    let script = edit_script_with_limit(&old_lines, &new_lines, max_cells);
    if !script.exact {
        warn!(
            old_lines = old_lines.len(),
            new_lines = new_lines.len(),
            max_cells,
            "Diff exceeds cell budget; treating the changed region as new"
        );
    }
    classify(&script)
}
