//! Stub collaborators for update checker tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use action_update_checker::version::error::FetchError;
use action_update_checker::version::remote::{
    BranchContainment, ContainingBranches, RefLister, ReleaseComparator, ReleaseRelation,
};
use action_update_checker::version::types::{RemoteRef, RemoteRefs};
use action_update_checker::version::{
    CheckOptions, Collaborators, Dependency, Requirement, UpdateChecker,
};

pub const URL: &str = "https://github.com/actions/setup-node";
pub const NAME: &str = "actions/setup-node";

/// Reference lister serving a fixed snapshot and counting calls
#[derive(Default)]
pub struct StubLister {
    refs: Vec<RemoteRef>,
    default_branch: Option<String>,
    calls: AtomicUsize,
}

impl StubLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, commit: &str) -> Self {
        self.refs.push(RemoteRef::tag(name, commit));
        self
    }

    pub fn with_tags(self, tags: &[(&str, &str)]) -> Self {
        tags.iter()
            .fold(self, |lister, (name, commit)| lister.with_tag(name, commit))
    }

    pub fn with_branch(mut self, name: &str, commit: &str) -> Self {
        self.refs.push(RemoteRef::branch(name, commit));
        self
    }

    pub fn with_default_branch(mut self, name: &str, commit: &str) -> Self {
        self.default_branch = Some(name.to_string());
        self.with_branch(name, commit)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefLister for StubLister {
    async fn list_refs(&self, url: &str) -> Result<RemoteRefs, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url != URL {
            return Err(FetchError::NotFound(url.to_string()));
        }
        Ok(RemoteRefs {
            refs: self.refs.clone(),
            default_branch: self.default_branch.clone(),
        })
    }
}

/// Comparator answering from a table keyed by commit
#[derive(Default)]
pub struct StubComparator {
    relations: HashMap<String, ReleaseRelation>,
}

impl StubComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, commit: &str, relation: ReleaseRelation) -> Self {
        self.relations.insert(commit.to_string(), relation);
        self
    }
}

#[async_trait]
impl ReleaseComparator for StubComparator {
    async fn compare(
        &self,
        _url: &str,
        _release_tag: &str,
        commit: &str,
    ) -> Result<ReleaseRelation, FetchError> {
        Ok(self
            .relations
            .get(commit)
            .copied()
            .unwrap_or(ReleaseRelation::Unrelated))
    }
}

/// Containment lookup answering from a table keyed by commit
#[derive(Default)]
pub struct StubContainment {
    containing: HashMap<String, Vec<String>>,
    default_branch: Option<String>,
    fail: bool,
}

impl StubContainment {
    pub fn new(default_branch: &str) -> Self {
        Self {
            default_branch: Some(default_branch.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_commit(mut self, commit: &str, branches: &[&str]) -> Self {
        self.containing.insert(
            commit.to_string(),
            branches.iter().map(|b| b.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl BranchContainment for StubContainment {
    async fn branches_containing(
        &self,
        _url: &str,
        commit: &str,
    ) -> Result<ContainingBranches, FetchError> {
        if self.fail {
            return Err(FetchError::Git {
                command: "clone".to_string(),
                message: "repository not found".to_string(),
            });
        }
        Ok(ContainingBranches {
            branches: self.containing.get(commit).cloned().unwrap_or_default(),
            default_branch: self.default_branch.clone(),
        })
    }
}

/// Requirements pinned to `refs` of [`URL`], one per workflow file
pub fn requirements(refs: &[&str]) -> Vec<Requirement> {
    refs.iter()
        .enumerate()
        .map(|(i, r)| {
            Requirement::git(URL, r, format!(".github/workflows/job{i}.yml"))
                .with_declaration(format!("{NAME}@{r}"))
        })
        .collect()
}

pub fn build_checker(
    dependency: Dependency,
    options: CheckOptions,
    lister: Arc<StubLister>,
    comparator: StubComparator,
    containment: StubContainment,
) -> UpdateChecker {
    UpdateChecker::new(
        dependency,
        options,
        Collaborators {
            lister,
            comparator: Arc::new(comparator),
            containment: Arc::new(containment),
        },
    )
    .unwrap()
}

/// Checker for tag and branch pins, where the comparison collaborators are unused
pub fn tag_checker(lister: StubLister, refs: &[&str], ignored: &[&str]) -> UpdateChecker {
    build_checker(
        Dependency::new(NAME, requirements(refs)),
        CheckOptions {
            ignored_versions: ignored.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        },
        Arc::new(lister),
        StubComparator::new(),
        StubContainment::failing(),
    )
}
