//! Version classification for pinned references
//!
//! Accepts `2`, `v2.1`, `2.1.3` style references. Anything else (branch
//! names, commit SHAs, pre-release suffixes) is not a version.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?$").unwrap());

static COMMIT_SHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").unwrap());

/// A reference that parsed as a version
///
/// Equality and ordering look at the zero-padded numeric value only, so `v1.2`
/// and `1.2.0` are equal.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    /// The reference as written, e.g. `v2.1`
    pub raw: String,
    /// Numeric segments, one per precision level
    pub segments: Vec<u64>,
}

impl ParsedVersion {
    /// Number of segments encoded by the reference (1, 2 or 3)
    pub fn precision(&self) -> usize {
        self.segments.len()
    }

    /// Whether the reference was written with a leading `v`
    pub fn has_v_prefix(&self) -> bool {
        self.raw.starts_with('v')
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }

    /// Zero-padded semver form, used for range predicates
    pub fn to_semver(&self) -> Version {
        Version::new(self.segment(0), self.segment(1), self.segment(2))
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ParsedVersion {}

impl Hash for ParsedVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (0..3).for_each(|i| self.segment(i).hash(state));
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (0..3)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        f.write_str(&joined.join("."))
    }
}

/// Parse a reference into a version, or `None` if it is not version-like
pub fn classify(reference: &str) -> Option<ParsedVersion> {
    let captures = VERSION_RE.captures(reference)?;

    let segments = captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    Some(ParsedVersion {
        raw: reference.to_string(),
        segments,
    })
}

/// Whether the reference looks like a full or abbreviated commit SHA
pub fn looks_like_commit_sha(reference: &str) -> bool {
    COMMIT_SHA_RE.is_match(reference)
}

/// Whether two commit references name the same commit, allowing abbreviations
pub fn same_commit(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_ascii_lowercase(), b.to_ascii_lowercase());
    a.starts_with(&b) || b.starts_with(&a)
}
