//! Resolution of raw commit pins
//!
//! A commit pin is moved onto the commit of the latest release when the
//! release comparator can relate the two. Otherwise the branches containing
//! the commit decide: the default branch wins, a single branch is followed,
//! and several non-default branches are ambiguous.

use tracing::{debug, info, warn};

use crate::version::catalog::{Candidate, ReferenceCatalog};
use crate::version::classifier::same_commit;
use crate::version::error::CheckError;
use crate::version::ignore::IgnoreFilter;
use crate::version::remote::{
    BranchContainment, ContainingBranches, ReleaseComparator, ReleaseRelation,
};
use crate::version::resolver::{CandidateSearch, Resolution, ResolvedTarget, best_candidate};

/// Highest non-ignored tag at the highest precision the catalog offers
pub fn latest_release<'a>(catalog: &'a ReferenceCatalog, ignore: &IgnoreFilter) -> CandidateSearch<'a> {
    match catalog.max_precision() {
        Some(precision) => best_candidate(catalog, precision, ignore, true),
        None => CandidateSearch::NoCandidates,
    }
}

/// Resolution from the release comparison, or `None` when unrelated
pub fn resolve_against_release(
    current_commit: &str,
    release: &Candidate,
    relation: ReleaseRelation,
) -> Option<Resolution> {
    match relation {
        ReleaseRelation::ReachableBehind { .. } | ReleaseRelation::Diverged { .. } => {
            if same_commit(current_commit, &release.commit) {
                Some(Resolution::UpToDate)
            } else {
                Some(Resolution::Upgrade(ResolvedTarget::RawCommit {
                    commit: release.commit.clone(),
                }))
            }
        }
        ReleaseRelation::Unrelated => None,
    }
}

/// Resolution from the set of branches containing the commit
pub fn resolve_by_containment(
    current_commit: &str,
    containing: &ContainingBranches,
    catalog: &ReferenceCatalog,
) -> Result<Resolution, CheckError> {
    let default_branch = containing
        .default_branch
        .as_deref()
        .or(catalog.default_branch());

    let mut others: Vec<&str> = containing
        .branches
        .iter()
        .map(String::as_str)
        .filter(|b| Some(*b) != default_branch)
        .collect();
    others.sort_unstable();
    others.dedup();

    let chosen = match default_branch {
        Some(default) if containing.branches.iter().any(|b| b == default) => default,
        _ => match others.as_slice() {
            [] => {
                debug!("No branch contains {}", current_commit);
                return Ok(Resolution::Unresolvable);
            }
            [only] => *only,
            _ => {
                return Err(CheckError::AmbiguousBranches {
                    commit: current_commit.to_string(),
                    branches: others.iter().map(|b| b.to_string()).collect(),
                });
            }
        },
    };

    let Some(entry) = catalog.branch(chosen) else {
        warn!("Branch {} containing {} is not in the reference listing", chosen, current_commit);
        return Ok(Resolution::Unresolvable);
    };

    if same_commit(current_commit, &entry.target_commit) {
        return Ok(Resolution::UpToDate);
    }

    Ok(Resolution::Upgrade(ResolvedTarget::Branch {
        name: entry.name.clone(),
        commit: entry.target_commit.clone(),
    }))
}

/// Drives commit pin resolution through the external collaborators
pub struct CommitPinResolver<'a> {
    comparator: &'a dyn ReleaseComparator,
    containment: &'a dyn BranchContainment,
}

impl<'a> CommitPinResolver<'a> {
    pub fn new(comparator: &'a dyn ReleaseComparator, containment: &'a dyn BranchContainment) -> Self {
        Self {
            comparator,
            containment,
        }
    }

    pub async fn resolve(
        &self,
        url: &str,
        current_commit: &str,
        catalog: &ReferenceCatalog,
        ignore: &IgnoreFilter,
    ) -> Result<Resolution, CheckError> {
        match latest_release(catalog, ignore) {
            CandidateSearch::AllIgnored => return Ok(Resolution::AllIgnored),
            CandidateSearch::Found(release) => {
                if same_commit(current_commit, &release.commit) {
                    return Ok(Resolution::UpToDate);
                }

                let relation = self
                    .comparator
                    .compare(url, release.name(), current_commit)
                    .await?;
                debug!(
                    "{} relative to release {}: {:?}",
                    current_commit,
                    release.name(),
                    relation
                );

                if let Some(resolution) = resolve_against_release(current_commit, release, relation) {
                    return Ok(resolution);
                }
            }
            CandidateSearch::NoCandidates => {
                debug!("{} has no release tags", url);
            }
        }

        info!("Falling back to branch containment for {}@{}", url, current_commit);
        let containing = self
            .containment
            .branches_containing(url, current_commit)
            .await?;

        resolve_by_containment(current_commit, &containing, catalog)
    }
}
