//! Selecting the branch configuration that applies to an event.

use thiserror::Error;
use tracing::error;

use super::config::{BranchConfiguration, BranchEntry, RepositoryConfiguration, merge_defaults};

/// A `branches` entry that cannot be matched against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchLookupError {
    #[error("branches[{index}] has no `branch` name")]
    MissingBranchName { index: usize },
}

/// Scans `branches` for the entry whose `branch` equals `branch`.
///
/// The scan runs in order and stops at the first malformed entry it reaches,
/// even if a matching entry follows it.
pub fn scan_branches<'a>(
    branch: &str,
    branches: &'a [BranchEntry],
) -> Result<Option<&'a BranchEntry>, BranchLookupError> {
    for (index, entry) in branches.iter().enumerate() {
        match entry.branch.as_deref() {
            None | Some("") => return Err(BranchLookupError::MissingBranchName { index }),
            Some(name) if name == branch => return Ok(Some(entry)),
            Some(_) => {}
        }
    }
    Ok(None)
}

/// Finds the configuration for `branch`.
///
/// The primary branch uses the repository-level settings. Any other branch
/// must appear in `branches`; its entry is layered over the repository-level
/// settings. A malformed `branches` list is logged and treated as no match.
pub fn find_branch_configuration(
    branch: &str,
    config: &RepositoryConfiguration,
) -> Option<BranchConfiguration> {
    if config.primary_branch.as_deref() == Some(branch) {
        return Some(merge_defaults(config, branch, &Default::default()));
    }

    let branches = config.branches.as_deref()?;

    match scan_branches(branch, branches) {
        Ok(found) => found.map(|entry| merge_defaults(config, branch, &entry.settings)),
        Err(e) => {
            error!(
                branch,
                error = %e,
                config = ?config,
                "Got an error finding the branch config"
            );
            None
        }
    }
}
