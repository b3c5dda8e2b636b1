//! Immutable snapshot of a repository's tags and branches

use indexmap::IndexMap;

use crate::version::classifier::{ParsedVersion, classify};
use crate::version::types::RemoteRefs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    Branch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub target_commit: String,
    pub kind: RefKind,
}

/// A tag that parsed as a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: ParsedVersion,
    pub commit: String,
}

impl Candidate {
    pub fn name(&self) -> &str {
        &self.version.raw
    }
}

/// Tags and branches of one repository, deduplicated by name within each kind
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    tags: IndexMap<String, CatalogEntry>,
    branches: IndexMap<String, CatalogEntry>,
    candidates: Vec<Candidate>,
    default_branch: Option<String>,
}

impl ReferenceCatalog {
    pub fn build(remote: RemoteRefs) -> Self {
        let mut tags = IndexMap::new();
        let mut branches = IndexMap::new();

        for r in remote.refs {
            let (kind, map) = if r.is_branch {
                (RefKind::Branch, &mut branches)
            } else {
                (RefKind::Tag, &mut tags)
            };
            map.insert(
                r.name.clone(),
                CatalogEntry {
                    name: r.name,
                    target_commit: r.target_commit,
                    kind,
                },
            );
        }

        let candidates = tags
            .values()
            .filter_map(|entry| {
                classify(&entry.name).map(|version| Candidate {
                    version,
                    commit: entry.target_commit.clone(),
                })
            })
            .collect();

        Self {
            tags,
            branches,
            candidates,
            default_branch: remote.default_branch,
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.tags.values()
    }

    pub fn branches(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.branches.values()
    }

    pub fn tag(&self, name: &str) -> Option<&CatalogEntry> {
        self.tags.get(name)
    }

    pub fn branch(&self, name: &str) -> Option<&CatalogEntry> {
        self.branches.get(name)
    }

    /// Whether `name` is a tag that parses as a version
    pub fn is_version_candidate(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c.name() == name)
    }

    /// Every version candidate, in listing order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Version candidates whose precision equals `precision`
    pub fn candidates_at_precision(&self, precision: usize) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.version.precision() == precision)
            .collect()
    }

    /// Highest precision among the version candidates
    pub fn max_precision(&self) -> Option<usize> {
        self.candidates.iter().map(|c| c.version.precision()).max()
    }

    pub fn default_branch(&self) -> Option<&str> {
        self.default_branch.as_deref()
    }

    /// Commit at the tip of the designated default branch
    pub fn default_branch_tip(&self) -> Option<&str> {
        self.default_branch
            .as_deref()
            .and_then(|name| self.branch(name))
            .map(|entry| entry.target_commit.as_str())
    }
}
