//! Effective base resolution.
//!
//! The base revision a push claims is unreliable: it is the null revision
//! when a branch is created and may be stale after a forced push. The gate
//! therefore always diffs against the merge-base of the trunk and the target.

use crate::error::{GateError, Result};
use crate::model::Revision;
use crate::repo::RepositoryHistory;
use tracing::{debug, warn};

/// Compute the revision to diff `target` against.
///
/// When the trunk and target have several best common ancestors the first
/// one reported by the history store wins.
///
/// # Errors
///
/// Returns `NoCommonAncestor` if the histories are unrelated, or any error
/// raised by the history query.
pub fn resolve_effective_base<R: RepositoryHistory + ?Sized>(
    repo: &R,
    claimed_base: &Revision,
    target: &Revision,
    trunk: &str,
) -> Result<Revision> {
    let bases = repo.merge_bases(trunk, target)?;

    let Some(base) = bases.first() else {
        return Err(GateError::NoCommonAncestor {
            trunk: trunk.to_string(),
            target: target.to_string(),
        });
    };

    if bases.len() > 1 {
        warn!(
            count = bases.len(),
            chosen = %base,
            "Multiple merge-bases with trunk; using the first"
        );
    }
    if base != claimed_base {
        debug!(claimed = %claimed_base, effective = %base, "Effective base differs from pushed base");
    }

    Ok(base.clone())
}
