//! Longest-common-subsequence edit scripts.
//!
//! [`edit_script`] compares two sequences and returns a tagged list of
//! match / delete / insert operations that turns `old` into `new` with the
//! minimal number of insertions and deletions. The operations are ordered
//! so that walking them visits both sequences front to back.
//!
//! Common prefixes and suffixes are matched directly; only the differing
//! middle gets the quadratic LCS table. When that table would exceed the
//! configured cell budget the middle is reported as a full replacement and
//! the script is marked inexact.

pub mod align;

pub use align::{NewLines, align_and_classify, classify, new_lines_between};

/// Default upper bound on LCS table cells (rows x columns).
pub const DEFAULT_MAX_CELLS: usize = 25_000_000;

/// One step of an edit script. Indices are 0-based positions in the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// `old[old] == new[new]`, present on both sides.
    Match { old: usize, new: usize },
    /// Only in the old sequence.
    Delete { old: usize },
    /// Only in the new sequence.
    Insert { new: usize },
}

/// Result of comparing two sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript {
    pub ops: Vec<DiffOp>,
    /// False when the cell budget forced a whole-region replacement.
    pub exact: bool,
}

impl EditScript {
    /// Number of insert plus delete operations.
    #[must_use]
    pub fn edit_distance(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| !matches!(op, DiffOp::Match { .. }))
            .count()
    }
}

/// Compute an edit script with the default cell budget.
#[must_use]
pub fn edit_script<T: PartialEq>(old: &[T], new: &[T]) -> EditScript {
    edit_script_with_limit(old, new, DEFAULT_MAX_CELLS)
}

/// Compute an edit script, bounding the LCS table to `max_cells` cells.
#[must_use]
pub fn edit_script_with_limit<T: PartialEq>(old: &[T], new: &[T], max_cells: usize) -> EditScript {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a == b)
        .count();
    let old_rest = &old[prefix..];
    let new_rest = &new[prefix..];
    let suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_mid = &old_rest[..old_rest.len() - suffix];
    let new_mid = &new_rest[..new_rest.len() - suffix];

    let mut ops = Vec::with_capacity(old.len() + new.len());
    ops.extend((0..prefix).map(|i| DiffOp::Match { old: i, new: i }));

    let exact = align_middle(old_mid, new_mid, prefix, max_cells, &mut ops);

    let old_tail = prefix + old_mid.len();
    let new_tail = prefix + new_mid.len();
    ops.extend((0..suffix).map(|k| DiffOp::Match {
        old: old_tail + k,
        new: new_tail + k,
    }));

    EditScript { ops, exact }
}

/// Align the differing middle region. `offset` is where the region starts
/// in both inputs. Returns false if the budget was exceeded.
fn align_middle<T: PartialEq>(
    old: &[T],
    new: &[T],
    offset: usize,
    max_cells: usize,
    ops: &mut Vec<DiffOp>,
) -> bool {
    let n = old.len();
    let m = new.len();

    let within_budget = (n + 1)
        .checked_mul(m + 1)
        .is_some_and(|cells| cells <= max_cells);
    if n == 0 || m == 0 || !within_budget {
        ops.extend((0..n).map(|i| DiffOp::Delete { old: offset + i }));
        ops.extend((0..m).map(|j| DiffOp::Insert { new: offset + j }));
        return n == 0 || m == 0 || within_budget;
    }

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if old[i] == new[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut i = 0;
    let mut j = 0;
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(DiffOp::Match {
                old: offset + i,
                new: offset + j,
            });
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            ops.push(DiffOp::Delete { old: offset + i });
            i += 1;
        } else {
            ops.push(DiffOp::Insert { new: offset + j });
            j += 1;
        }
    }
    ops.extend((i..n).map(|i| DiffOp::Delete { old: offset + i }));
    ops.extend((j..m).map(|j| DiffOp::Insert { new: offset + j }));

    true
}
