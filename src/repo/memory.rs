//! In-memory `RepositoryHistory` for tests and dry runs.

use super::RepositoryHistory;
use crate::error::{GateError, Result};
use crate::model::{FileChange, FileStatus, Revision};
use std::collections::{BTreeMap, HashMap};

/// Snapshots keyed by revision plus an explicit merge-base table.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    snapshots: HashMap<Revision, BTreeMap<String, String>>,
    merge_bases: HashMap<(String, Revision), Vec<Revision>>,
    extra_changes: HashMap<(Revision, Revision), Vec<FileChange>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the full tree of `revision`.
    pub fn commit<I, P, C>(&mut self, revision: &str, files: I) -> Revision
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let rev = Revision::new(revision);
        let tree = files
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        self.snapshots.insert(rev.clone(), tree);
        rev
    }

    /// Declare the merge-bases of `trunk` and `target`, in reporting order.
    pub fn set_merge_bases(&mut self, trunk: &str, target: &Revision, bases: Vec<Revision>) {
        self.merge_bases
            .insert((trunk.to_string(), target.clone()), bases);
    }

    /// Report an extra change (renames, type changes) between two revisions.
    pub fn add_change(&mut self, base: &Revision, target: &Revision, change: FileChange) {
        self.extra_changes
            .entry((base.clone(), target.clone()))
            .or_default()
            .push(change);
    }

    fn tree(&self, revision: &Revision) -> Result<&BTreeMap<String, String>> {
        self.snapshots.get(revision).ok_or_else(|| {
            GateError::git(
                format!("show {revision}"),
                format!("unknown revision '{revision}'"),
            )
        })
    }
}

impl RepositoryHistory for MemoryRepository {
    fn merge_bases(&self, trunk: &str, target: &Revision) -> Result<Vec<Revision>> {
        Ok(self
            .merge_bases
            .get(&(trunk.to_string(), target.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn changed_paths(&self, base: &Revision, target: &Revision) -> Result<Vec<FileChange>> {
        let old = self.tree(base)?;
        let new = self.tree(target)?;
        let mut changes = Vec::new();

        for (path, content) in new {
            match old.get(path) {
                None => changes.push(FileChange::new(path.clone(), FileStatus::Added)),
                Some(previous) if previous != content => {
                    changes.push(FileChange::new(path.clone(), FileStatus::Modified));
                }
                Some(_) => {}
            }
        }
        for path in old.keys().filter(|path| !new.contains_key(*path)) {
            changes.push(FileChange::new(path.clone(), FileStatus::Deleted));
        }
        if let Some(extra) = self.extra_changes.get(&(base.clone(), target.clone())) {
            changes.extend(extra.iter().cloned());
        }

        Ok(changes)
    }

    fn read_file(&self, path: &str, revision: &Revision) -> Result<Option<String>> {
        Ok(self.tree(revision)?.get(path).cloned())
    }
}
