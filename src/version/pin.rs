//! Classification of a pinned reference against a catalog

use crate::version::catalog::ReferenceCatalog;
use crate::version::classifier::{ParsedVersion, classify, looks_like_commit_sha};

/// What kind of reference a declaration is pinned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pin {
    /// A version-like reference, e.g. `v2.1`
    Version(ParsedVersion),
    /// A branch of the repository, e.g. `main`
    Branch(String),
    /// A full or abbreviated commit SHA
    Commit(String),
    /// Anything else, e.g. `latest`
    Alias(String),
}

impl Pin {
    pub fn classify(reference: &str, catalog: &ReferenceCatalog) -> Self {
        if catalog.branch(reference).is_some()
            && !catalog.is_version_candidate(reference)
            && !looks_like_commit_sha(reference)
        {
            return Pin::Branch(reference.to_string());
        }

        if let Some(version) = classify(reference) {
            return Pin::Version(version);
        }

        if looks_like_commit_sha(reference) {
            return Pin::Commit(reference.to_string());
        }

        Pin::Alias(reference.to_string())
    }

    /// Catalog-independent view, used before the catalog is fetched
    pub fn classify_offline(reference: &str) -> Self {
        Self::classify(reference, &ReferenceCatalog::default())
    }

    /// Whether this pin carries version information usable for resolution
    pub fn has_version_signal(&self) -> bool {
        matches!(self, Pin::Version(_) | Pin::Commit(_))
    }
}
