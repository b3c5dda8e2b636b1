//! Ignored-version constraints
//!
//! Constraints are plain version predicates such as `>= 1.1.0`, `1.1.0`
//! (exactly that version) or `~> 1.0`, evaluated against the zero-padded
//! numeric segments of a candidate. Comma-separated parts must all hold.

use std::sync::LazyLock;

use regex::Regex;
use semver::VersionReq;

use crate::version::classifier::ParsedVersion;
use crate::version::error::CheckError;

// Operator, then a version with an optional `v` prefix and `.a` pre-release floor
static PREDICATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(~>|>=|<=|=|>|<)?\s*v?(\d+(?:\.\d+)*)(?:\.a)?$").unwrap()
});

/// Parse a version predicate into a [`VersionReq`]
///
/// Bare versions and comparison operands are padded to three segments, so
/// `1.1` means exactly `1.1.0` and `> 1.1` admits `1.1.1`. Cargo forms such as
/// `^1.2` or `~1.2` are passed through unchanged.
pub fn parse_predicate(constraint: &str) -> Result<VersionReq, semver::Error> {
    let translated: Vec<String> = constraint.split(',').map(translate).collect();
    VersionReq::parse(&translated.join(", "))
}

fn translate(part: &str) -> String {
    let part = part.trim();
    let Some(captures) = PREDICATE_RE.captures(part) else {
        return part.to_string();
    };
    let Some(segments) = captures[2]
        .split('.')
        .map(|s| s.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()
    else {
        return part.to_string();
    };

    match captures.get(1).map_or("=", |m| m.as_str()) {
        "~>" => {
            let mut upper = segments.clone();
            if upper.len() > 1 {
                upper.pop();
            }
            if let Some(last) = upper.last_mut() {
                *last += 1;
            }
            format!(">={}, <{}", padded(&segments), padded(&upper))
        }
        op => format!("{op}{}", padded(&segments)),
    }
}

fn padded(segments: &[u64]) -> String {
    (0..segments.len().max(3))
        .map(|i| segments.get(i).copied().unwrap_or(0).to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    constraints: Vec<VersionReq>,
}

impl IgnoreFilter {
    pub fn parse<S: AsRef<str>>(constraints: &[S]) -> Result<Self, CheckError> {
        let constraints = constraints
            .iter()
            .map(|c| {
                let c = c.as_ref();
                parse_predicate(c).map_err(|source| CheckError::InvalidIgnoreConstraint {
                    constraint: c.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { constraints })
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether any constraint matches the version
    pub fn is_ignored(&self, version: &ParsedVersion) -> bool {
        let version = version.to_semver();
        self.constraints.iter().any(|c| c.matches(&version))
    }
}
