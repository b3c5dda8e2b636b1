//! Data shapes exchanged with the manifest parser, the file patcher and the
//! reference lister

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Package manager tag for workflow action dependencies
pub const PACKAGE_MANAGER: &str = "github_actions";

/// A dependency and every declaration of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Action name, e.g. `actions/checkout`
    pub name: String,
    /// Current version, if known
    pub version: Option<String>,
    pub requirements: Vec<Requirement>,
    pub package_manager: String,
    /// Commit a tag pin pointed at when it was declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_commit: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        Self {
            name: name.into(),
            version: None,
            requirements,
            package_manager: PACKAGE_MANAGER.to_string(),
            pinned_commit: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_pinned_commit(mut self, commit: impl Into<String>) -> Self {
        self.pinned_commit = Some(commit.into());
        self
    }
}

/// One declaration of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Always `None` for git-pinned actions
    pub requirement_text: Option<String>,
    pub groups: BTreeSet<String>,
    pub file: PathBuf,
    pub source: GitSource,
    pub metadata: RequirementMetadata,
}

impl Requirement {
    /// Requirement pinned to `reference` of `url`, declared in `file`
    pub fn git(url: &str, reference: &str, file: impl Into<PathBuf>) -> Self {
        Self {
            requirement_text: None,
            groups: BTreeSet::new(),
            file: file.into(),
            source: GitSource {
                url: url.to_string(),
                reference: reference.to_string(),
                branch: None,
            },
            metadata: RequirementMetadata::default(),
        }
    }

    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.metadata.declaration_string = declaration.into();
        self
    }

    /// Copy of this requirement pinned to another reference
    pub fn repinned(&self, reference: &str) -> Self {
        Self {
            source: GitSource {
                reference: reference.to_string(),
                ..self.source.clone()
            },
            ..self.clone()
        }
    }
}

/// Git source of a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "git")]
pub struct GitSource {
    pub url: String,
    /// The pin as written: tag, branch or commit SHA
    #[serde(rename = "ref")]
    pub reference: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementMetadata {
    /// The declaration as it appears in the file, e.g. `actions/checkout@v4`
    pub declaration_string: String,
}

/// A tag or branch as reported by the reference lister
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub target_commit: String,
    pub is_branch: bool,
}

impl RemoteRef {
    pub fn tag(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            target_commit: commit.to_string(),
            is_branch: false,
        }
    }

    pub fn branch(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            target_commit: commit.to_string(),
            is_branch: true,
        }
    }
}

/// Snapshot of a repository's references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRefs {
    pub refs: Vec<RemoteRef>,
    pub default_branch: Option<String>,
}
