//! Tag-based resolution of the best upgrade target
//!
//! Candidates are only ever compared within the precision of the current pin:
//! a dependency pinned at `v1` stays on one-segment tags, `v1.0` on two-segment
//! tags, and so on. Major-version boundaries are crossed freely.

use tracing::debug;

use crate::version::catalog::{Candidate, ReferenceCatalog};
use crate::version::classifier::{ParsedVersion, same_commit};
use crate::version::ignore::IgnoreFilter;
use crate::version::pin::Pin;

/// The single target a dependency should be re-pinned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Tag {
        name: String,
        commit: String,
        version: ParsedVersion,
    },
    Branch {
        name: String,
        commit: String,
    },
    RawCommit {
        commit: String,
    },
}

impl ResolvedTarget {
    fn tag(candidate: &Candidate) -> Self {
        ResolvedTarget::Tag {
            name: candidate.name().to_string(),
            commit: candidate.commit.clone(),
            version: candidate.version.clone(),
        }
    }

    /// Literal reference to write into a declaration
    pub fn reference(&self) -> &str {
        match self {
            ResolvedTarget::Tag { name, .. } | ResolvedTarget::Branch { name, .. } => name,
            ResolvedTarget::RawCommit { commit } => commit,
        }
    }

    pub fn commit(&self) -> &str {
        match self {
            ResolvedTarget::Tag { commit, .. }
            | ResolvedTarget::Branch { commit, .. }
            | ResolvedTarget::RawCommit { commit } => commit,
        }
    }

    /// Version for tags, commit otherwise
    pub fn version_string(&self) -> String {
        match self {
            ResolvedTarget::Tag { version, .. } => version.to_string(),
            ResolvedTarget::Branch { commit, .. } | ResolvedTarget::RawCommit { commit } => {
                commit.clone()
            }
        }
    }
}

/// Outcome of resolving one pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A newer target exists
    Upgrade(ResolvedTarget),
    /// The current tag now points at a different commit
    TagMoved(ResolvedTarget),
    /// Pinned to a moving branch; the target is its tip and is informational only
    BranchTip(ResolvedTarget),
    UpToDate,
    /// Every candidate was excluded by ignore constraints
    AllIgnored,
    /// The pin is neither a version, a commit nor a known branch
    Unresolvable,
}

impl Resolution {
    pub fn target(&self) -> Option<&ResolvedTarget> {
        match self {
            Resolution::Upgrade(t) | Resolution::TagMoved(t) | Resolution::BranchTip(t) => {
                Some(t)
            }
            Resolution::UpToDate | Resolution::AllIgnored | Resolution::Unresolvable => None,
        }
    }
}

/// Result of searching the candidates of one precision
#[derive(Debug, PartialEq, Eq)]
pub enum CandidateSearch<'a> {
    Found(&'a Candidate),
    NoCandidates,
    AllIgnored,
}

/// Highest non-ignored tag candidate at `precision`
///
/// Equal numeric values spelled differently (`v1.2` and `1.2`) are broken in
/// favour of the spelling whose `v` prefix matches `prefer_v_prefix`.
pub fn best_candidate<'a>(
    catalog: &'a ReferenceCatalog,
    precision: usize,
    ignore: &IgnoreFilter,
    prefer_v_prefix: bool,
) -> CandidateSearch<'a> {
    let candidates = catalog.candidates_at_precision(precision);
    if candidates.is_empty() {
        return CandidateSearch::NoCandidates;
    }

    let style = |c: &Candidate| c.version.has_v_prefix() == prefer_v_prefix;

    candidates
        .into_iter()
        .filter(|c| !ignore.is_ignored(&c.version))
        .max_by(|a, b| a.version.cmp(&b.version).then(style(a).cmp(&style(b))))
        .map_or(CandidateSearch::AllIgnored, CandidateSearch::Found)
}

/// Resolve a tag or branch pin
///
/// Commit pins are handled by [`crate::version::commit_pin`]; here they, like
/// aliases, are unresolvable.
pub fn resolve(
    current_ref: &str,
    catalog: &ReferenceCatalog,
    ignore: &IgnoreFilter,
    pinned_commit: Option<&str>,
) -> Resolution {
    match Pin::classify(current_ref, catalog) {
        Pin::Branch(name) => resolve_branch(&name, catalog),
        Pin::Version(current) => resolve_version(&current, catalog, ignore, pinned_commit),
        Pin::Commit(_) | Pin::Alias(_) => Resolution::Unresolvable,
    }
}

pub fn resolve_branch(name: &str, catalog: &ReferenceCatalog) -> Resolution {
    match catalog.branch(name) {
        Some(entry) => Resolution::BranchTip(ResolvedTarget::Branch {
            name: entry.name.clone(),
            commit: entry.target_commit.clone(),
        }),
        None => Resolution::Unresolvable,
    }
}

pub fn resolve_version(
    current: &ParsedVersion,
    catalog: &ReferenceCatalog,
    ignore: &IgnoreFilter,
    pinned_commit: Option<&str>,
) -> Resolution {
    let best = match best_candidate(catalog, current.precision(), ignore, current.has_v_prefix()) {
        CandidateSearch::Found(best) => best,
        CandidateSearch::NoCandidates => {
            debug!("No tags at precision {} for {}", current.precision(), current.raw);
            return Resolution::UpToDate;
        }
        CandidateSearch::AllIgnored => return Resolution::AllIgnored,
    };

    if best.version > *current {
        debug!("Resolved {} -> {} ({})", current.raw, best.name(), best.commit);
        return Resolution::Upgrade(ResolvedTarget::tag(best));
    }

    match pinned_commit {
        Some(pinned) if best.version == *current && !same_commit(pinned, &best.commit) => {
            debug!("Tag {} moved from {} to {}", best.name(), pinned, best.commit);
            Resolution::TagMoved(ResolvedTarget::tag(best))
        }
        _ => Resolution::UpToDate,
    }
}
