//! Update checker facade for one dependency
//!
//! Fetches the reference catalog once, resolves the primary pin once, and
//! answers every question about the dependency from those snapshots.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::version::catalog::ReferenceCatalog;
use crate::version::classifier::ParsedVersion;
use crate::version::commit_pin::CommitPinResolver;
use crate::version::error::CheckError;
use crate::version::ignore::IgnoreFilter;
use crate::version::pin::Pin;
use crate::version::remote::{BranchContainment, RefLister, ReleaseComparator};
use crate::version::resolver::{self, Resolution};
use crate::version::rewriter;
use crate::version::security::{AdvisorySet, SecurityAdvisory, lowest_security_fix};
use crate::version::types::{Dependency, Requirement};

/// Which requirements the caller allows to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementsToUnlock {
    Own,
    All,
    None,
}

/// Caller preferences for one check
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Version-range predicates of versions never to update to
    pub ignored_versions: Vec<String>,
    /// Fail with [`CheckError::AllVersionsIgnored`] instead of reporting the current version
    pub raise_on_ignored: bool,
    pub security_advisories: Vec<SecurityAdvisory>,
}

/// External collaborators used by a check
#[derive(Clone)]
pub struct Collaborators {
    pub lister: Arc<dyn RefLister>,
    pub comparator: Arc<dyn ReleaseComparator>,
    pub containment: Arc<dyn BranchContainment>,
}

/// The declaration whose pin drives resolution
#[derive(Debug, Clone)]
struct PrimaryPin {
    url: String,
    reference: String,
}

pub struct UpdateChecker {
    dependency: Dependency,
    primary: Option<PrimaryPin>,
    ignore: IgnoreFilter,
    advisories: AdvisorySet,
    raise_on_ignored: bool,
    collaborators: Collaborators,
    catalog: OnceCell<ReferenceCatalog>,
    resolution: OnceCell<Resolution>,
}

impl UpdateChecker {
    pub fn new(
        dependency: Dependency,
        options: CheckOptions,
        collaborators: Collaborators,
    ) -> Result<Self, CheckError> {
        let ignore = IgnoreFilter::parse(&options.ignored_versions)?;
        let advisories = AdvisorySet::parse(&options.security_advisories)?;
        let primary = primary_pin(&dependency.requirements);

        Ok(Self {
            dependency,
            primary,
            ignore,
            advisories,
            raise_on_ignored: options.raise_on_ignored,
            collaborators,
            catalog: OnceCell::new(),
            resolution: OnceCell::new(),
        })
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Whether a newer pin exists and may be written
    pub async fn can_update(&self, unlock: RequirementsToUnlock) -> Result<bool, CheckError> {
        if unlock == RequirementsToUnlock::None {
            return Ok(false);
        }
        if !self.has_version_signal() {
            debug!("{}: no requirement carries a version signal", self.dependency.name);
            return Ok(false);
        }

        Ok(matches!(self.checked_resolution().await?, Resolution::Upgrade(_)))
    }

    /// Version of the resolved tag, or commit for branch and commit pins
    pub async fn latest_version(&self) -> Result<Option<String>, CheckError> {
        let version = match self.checked_resolution().await? {
            Resolution::Upgrade(t) | Resolution::TagMoved(t) | Resolution::BranchTip(t) => {
                Some(t.version_string())
            }
            Resolution::UpToDate | Resolution::AllIgnored => self.current_version(),
            Resolution::Unresolvable => None,
        };
        Ok(version)
    }

    /// Equal to [`Self::latest_version`]: there is no separate resolution step
    pub async fn latest_resolvable_version(&self) -> Result<Option<String>, CheckError> {
        self.latest_version().await
    }

    pub async fn updated_requirements(&self) -> Result<Vec<Requirement>, CheckError> {
        let Some(primary) = &self.primary else {
            return Ok(self.dependency.requirements.clone());
        };
        let resolution = self.checked_resolution().await?;

        Ok(rewriter::rewrite(
            &self.dependency.requirements,
            &primary.url,
            resolution,
        ))
    }

    /// Whether the current version is affected by an advisory
    pub fn vulnerable(&self) -> bool {
        match self.primary_version() {
            Some(current) => self.advisories.is_vulnerable(&current),
            None => false,
        }
    }

    /// Smallest non-vulnerable tag above the current version at its precision
    pub async fn lowest_security_fix_version(&self) -> Result<Option<String>, CheckError> {
        let Some(current) = self.primary_version() else {
            return Ok(None);
        };
        let catalog = self.catalog().await?;

        Ok(
            lowest_security_fix(&current, catalog, &self.ignore, &self.advisories)
                .map(|c| c.version.to_string()),
        )
    }

    pub async fn lowest_resolvable_security_fix_version(
        &self,
    ) -> Result<Option<String>, CheckError> {
        self.lowest_security_fix_version().await
    }

    /// Resolution of the primary pin, computed at most once
    pub async fn resolution(&self) -> Result<&Resolution, CheckError> {
        self.resolution.get_or_try_init(|| self.resolve()).await
    }

    async fn checked_resolution(&self) -> Result<&Resolution, CheckError> {
        let resolution = self.resolution().await?;
        if *resolution == Resolution::AllIgnored && self.raise_on_ignored {
            return Err(CheckError::AllVersionsIgnored {
                dependency: self.dependency.name.clone(),
            });
        }
        Ok(resolution)
    }

    async fn catalog(&self) -> Result<&ReferenceCatalog, CheckError> {
        let Some(primary) = &self.primary else {
            return Ok(self.catalog.get_or_init(|| async { ReferenceCatalog::default() }).await);
        };

        self.catalog
            .get_or_try_init(|| async {
                let refs = self.collaborators.lister.list_refs(&primary.url).await?;
                debug!("Fetched {} references for {}", refs.refs.len(), primary.url);
                Ok::<_, CheckError>(ReferenceCatalog::build(refs))
            })
            .await
    }

    async fn resolve(&self) -> Result<Resolution, CheckError> {
        let Some(primary) = &self.primary else {
            return Ok(Resolution::Unresolvable);
        };
        let catalog = self.catalog().await?;

        let resolution = match Pin::classify(&primary.reference, catalog) {
            Pin::Version(current) => resolver::resolve_version(
                &current,
                catalog,
                &self.ignore,
                self.dependency.pinned_commit.as_deref(),
            ),
            Pin::Branch(name) => resolver::resolve_branch(&name, catalog),
            Pin::Commit(commit) => {
                CommitPinResolver::new(
                    self.collaborators.comparator.as_ref(),
                    self.collaborators.containment.as_ref(),
                )
                .resolve(&primary.url, &commit, catalog, &self.ignore)
                .await?
            }
            Pin::Alias(alias) => {
                debug!("{}: '{}' is not a resolvable reference", self.dependency.name, alias);
                Resolution::Unresolvable
            }
        };

        info!(
            "{}@{} resolved to {:?}",
            self.dependency.name, primary.reference, resolution
        );
        Ok(resolution)
    }

    fn group(&self) -> impl Iterator<Item = &Requirement> {
        let url = self.primary.as_ref().map(|p| p.url.as_str());
        self.dependency
            .requirements
            .iter()
            .filter(move |r| Some(r.source.url.as_str()) == url)
    }

    fn has_version_signal(&self) -> bool {
        self.group()
            .any(|r| Pin::classify_offline(&r.source.reference).has_version_signal())
    }

    fn primary_version(&self) -> Option<ParsedVersion> {
        match Pin::classify_offline(&self.primary.as_ref()?.reference) {
            Pin::Version(version) => Some(version),
            Pin::Commit(_) | Pin::Branch(_) | Pin::Alias(_) => None,
        }
    }

    fn current_version(&self) -> Option<String> {
        if let Some(version) = &self.dependency.version {
            return Some(version.clone());
        }
        match Pin::classify_offline(&self.primary.as_ref()?.reference) {
            Pin::Version(version) => Some(version.to_string()),
            Pin::Commit(commit) => Some(commit),
            Pin::Branch(_) | Pin::Alias(_) => None,
        }
    }
}

/// First version pin, else first commit pin, else the first declaration
fn primary_pin(requirements: &[Requirement]) -> Option<PrimaryPin> {
    let pins: Vec<(Pin, &Requirement)> = requirements
        .iter()
        .map(|r| (Pin::classify_offline(&r.source.reference), r))
        .collect();

    let chosen = pins
        .iter()
        .find(|(pin, _)| matches!(pin, Pin::Version(_)))
        .or_else(|| pins.iter().find(|(pin, _)| matches!(pin, Pin::Commit(_))))
        .or_else(|| pins.first())
        .map(|(_, r)| *r)?;

    Some(PrimaryPin {
        url: chosen.source.url.clone(),
        reference: chosen.source.reference.clone(),
    })
}
