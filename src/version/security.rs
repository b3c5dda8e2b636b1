//! Security advisories and the lowest non-vulnerable upgrade

use semver::VersionReq;
use serde::Deserialize;

use crate::version::catalog::{Candidate, ReferenceCatalog};
use crate::version::classifier::ParsedVersion;
use crate::version::error::CheckError;
use crate::version::ignore::{IgnoreFilter, parse_predicate};

/// An advisory against the dependency
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAdvisory {
    /// Version-range predicates describing affected versions
    pub vulnerable_versions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdvisorySet {
    ranges: Vec<VersionReq>,
}

impl AdvisorySet {
    pub fn parse(advisories: &[SecurityAdvisory]) -> Result<Self, CheckError> {
        let ranges = advisories
            .iter()
            .flat_map(|a| a.vulnerable_versions.iter())
            .map(|range| {
                parse_predicate(range).map_err(|source| {
                    CheckError::InvalidAdvisoryRange {
                        range: range.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ranges })
    }

    pub fn is_vulnerable(&self, version: &ParsedVersion) -> bool {
        let version = version.to_semver();
        self.ranges.iter().any(|r| r.matches(&version))
    }
}

/// Smallest candidate above `current`, at its precision, that is neither
/// ignored nor vulnerable
pub fn lowest_security_fix<'a>(
    current: &ParsedVersion,
    catalog: &'a ReferenceCatalog,
    ignore: &IgnoreFilter,
    advisories: &AdvisorySet,
) -> Option<&'a Candidate> {
    catalog
        .candidates_at_precision(current.precision())
        .into_iter()
        .filter(|c| c.version > *current)
        .filter(|c| !ignore.is_ignored(&c.version) && !advisories.is_vulnerable(&c.version))
        .min_by(|a, b| a.version.cmp(&b.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::classifier::classify;
    use crate::version::types::{RemoteRef, RemoteRefs};

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::build(RemoteRefs {
            refs: ["v1.0.0", "v1.0.1", "v1.0.2", "v1.1.0", "v2"]
                .iter()
                .map(|t| RemoteRef::tag(t, "abcdef0"))
                .collect(),
            default_branch: None,
        })
    }

    fn advisories(ranges: &[&str]) -> AdvisorySet {
        AdvisorySet::parse(&[SecurityAdvisory {
            vulnerable_versions: ranges.iter().map(|r| r.to_string()).collect(),
        }])
        .unwrap()
    }

    #[test]
    fn lowest_fix_skips_vulnerable_versions() {
        let catalog = catalog();
        let current = classify("v1.0.0").unwrap();

        let fix = lowest_security_fix(
            &current,
            &catalog,
            &IgnoreFilter::default(),
            &advisories(&["< 1.0.2"]),
        );

        assert_eq!(fix.map(Candidate::name), Some("v1.0.2"));
    }

    #[test]
    fn lowest_fix_respects_ignores() {
        let catalog = catalog();
        let current = classify("v1.0.0").unwrap();
        let ignore = IgnoreFilter::parse(&["= 1.0.2"]).unwrap();

        let fix = lowest_security_fix(&current, &catalog, &ignore, &advisories(&["< 1.0.2"]));

        assert_eq!(fix.map(Candidate::name), Some("v1.1.0"));
    }

    #[test]
    fn lowest_fix_stays_at_current_precision() {
        let catalog = catalog();
        let current = classify("v1").unwrap();

        let fix = lowest_security_fix(
            &current,
            &catalog,
            &IgnoreFilter::default(),
            &advisories(&["< 2"]),
        );

        assert_eq!(fix.map(Candidate::name), Some("v2"));
    }

    #[test]
    fn is_vulnerable_matches_any_range() {
        let set = advisories(&["< 1.0.2", ">= 3"]);

        assert!(set.is_vulnerable(&classify("v1.0.1").unwrap()));
        assert!(!set.is_vulnerable(&classify("v2").unwrap()));
    }

    #[test]
    fn bare_advisory_version_matches_only_that_version() {
        let set = advisories(&["1.0.1", "~> 2.0"]);

        assert!(set.is_vulnerable(&classify("v1.0.1").unwrap()));
        assert!(!set.is_vulnerable(&classify("v1.1.0").unwrap()));
        assert!(set.is_vulnerable(&classify("v2.4").unwrap()));
        assert!(!set.is_vulnerable(&classify("v3").unwrap()));
    }
}
