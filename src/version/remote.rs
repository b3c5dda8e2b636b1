//! Traits for the collaborators that observe remote git state
//!
//! The resolution core never talks to the network or spawns processes; it
//! consumes the snapshots these collaborators return.

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;
use crate::version::types::RemoteRefs;

/// Lists every tag and branch of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RefLister: Send + Sync {
    /// Fetches all references of the repository at `url`
    ///
    /// # Returns
    /// * `Ok(RemoteRefs)` - Tags and branches with their target commits, plus the default branch
    /// * `Err(FetchError)` - If the listing fails
    async fn list_refs(&self, url: &str) -> Result<RemoteRefs, FetchError>;
}

/// How a commit relates to a release tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRelation {
    /// The commit is the release or an ancestor of it
    ReachableBehind { behind_by: Option<u64> },
    /// The commit is ahead of or has diverged from the release
    Diverged {
        ahead_by: Option<u64>,
        behind_by: Option<u64>,
    },
    /// No relationship could be computed
    Unrelated,
}

/// Compares a commit against a release tag
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseComparator: Send + Sync {
    async fn compare(
        &self,
        url: &str,
        release_tag: &str,
        commit: &str,
    ) -> Result<ReleaseRelation, FetchError>;
}

/// Branches whose history contains a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainingBranches {
    pub branches: Vec<String>,
    pub default_branch: Option<String>,
}

/// Looks up which remote branches contain a commit
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait BranchContainment: Send + Sync {
    async fn branches_containing(
        &self,
        url: &str,
        commit: &str,
    ) -> Result<ContainingBranches, FetchError>;
}
