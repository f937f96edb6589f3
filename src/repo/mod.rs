//! Read-only access to repository history.
//!
//! The gate never talks to git directly; it goes through
//! [`RepositoryHistory`] so the resolution and diffing logic can run
//! against [`MemoryRepository`] in tests and [`GitRepository`] in the hook.

mod git;
mod memory;

pub use git::GitRepository;
pub use memory::MemoryRepository;

use crate::error::Result;
use crate::model::{FileChange, Revision};

/// The history queries the gate needs.
pub trait RepositoryHistory {
    /// All best common ancestors of `trunk` and `target`, in the order the
    /// backing store reports them. Empty when the histories are unrelated.
    ///
    /// # Errors
    ///
    /// Returns an error if the query itself fails.
    fn merge_bases(&self, trunk: &str, target: &Revision) -> Result<Vec<Revision>>;

    /// Every path touched between `base` and `target` with its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn changed_paths(&self, base: &Revision, target: &Revision) -> Result<Vec<FileChange>>;

    /// Full text of `path` at `revision`, or `None` if it does not exist there.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be read.
    fn read_file(&self, path: &str, revision: &Revision) -> Result<Option<String>>;
}

impl<T: RepositoryHistory + ?Sized> RepositoryHistory for &T {
    fn merge_bases(&self, trunk: &str, target: &Revision) -> Result<Vec<Revision>> {
        (**self).merge_bases(trunk, target)
    }

    fn changed_paths(&self, base: &Revision, target: &Revision) -> Result<Vec<FileChange>> {
        (**self).changed_paths(base, target)
    }

    fn read_file(&self, path: &str, revision: &Revision) -> Result<Option<String>> {
        (**self).read_file(path, revision)
    }
}
