//! Change-set extraction.

use crate::error::Result;
use crate::model::{ChangeSet, FileStatus, Revision};
use crate::repo::RepositoryHistory;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Collect the added and modified paths between `base` and `target`.
///
/// Deleted paths have no new content to check. Renames, copies, type
/// changes and unmerged entries are skipped because their old identity is
/// ambiguous for line alignment.
///
/// # Errors
///
/// Returns any error raised by the history query.
pub fn extract_changes<R: RepositoryHistory + ?Sized>(
    repo: &R,
    base: &Revision,
    target: &Revision,
) -> Result<ChangeSet> {
    let mut set = ChangeSet::default();
    let mut seen = HashSet::new();

    for change in repo.changed_paths(base, target)? {
        match change.status {
            FileStatus::Added | FileStatus::Modified => {
                if !seen.insert(change.path.clone()) {
                    warn!(path = %change.path, "Path listed twice in change set; keeping first");
                    continue;
                }
                if change.status == FileStatus::Added {
                    set.added.push(change.path);
                } else {
                    set.modified.push(change.path);
                }
            }
            FileStatus::Deleted | FileStatus::Other => {
                debug!(path = %change.path, status = ?change.status, "Skipping path");
            }
        }
    }

    debug!(
        added = set.added.len(),
        modified = set.modified.len(),
        "Extracted change set"
    );
    Ok(set)
}
