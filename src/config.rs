use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::version::checker::{CheckOptions, Collaborators};
use crate::version::registries::git_command::DEFAULT_GIT_TIMEOUT_SECS;
use crate::version::registries::github::DEFAULT_BASE_URL;
use crate::version::registries::{GitHubComparator, GitRefLister, LocalGitContainment};

const APP_NAME: &str = "action-update-checker";

/// Checker configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    pub github: GitHubConfig,
    pub git: GitConfig,
    pub update: UpdateConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Local git client configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitConfig {
    /// Timeout for each git invocation in seconds
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_GIT_TIMEOUT_SECS,
        }
    }
}

/// Update policy
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateConfig {
    /// Ignored version constraints keyed by dependency name
    pub ignored_versions: HashMap<String, Vec<String>>,
    pub raise_on_ignored: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckerConfig {
    /// Load the config at `path`, or the default location if it exists
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Check options for one dependency, with extra ignores appended
    pub fn check_options(&self, dependency: &str, extra_ignores: &[String]) -> CheckOptions {
        let mut ignored_versions = self
            .update
            .ignored_versions
            .get(dependency)
            .cloned()
            .unwrap_or_default();
        ignored_versions.extend(extra_ignores.iter().cloned());

        CheckOptions {
            ignored_versions,
            raise_on_ignored: self.update.raise_on_ignored,
            security_advisories: Vec::new(),
        }
    }

    /// Git- and GitHub-backed collaborators
    pub fn collaborators(&self) -> Collaborators {
        let timeout = Duration::from_secs(self.git.timeout_secs);
        Collaborators {
            lister: Arc::new(GitRefLister::new(timeout)),
            comparator: Arc::new(GitHubComparator::new(&self.github.api_url)),
            containment: Arc::new(LocalGitContainment::new(timeout)),
        }
    }
}

/// Returns the path to the data directory.
/// Uses $XDG_DATA_HOME/action-update-checker if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/action-update-checker,
/// or ./action-update-checker if neither is available.
pub fn data_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the config directory, following $XDG_CONFIG_HOME.
pub fn config_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(format!("{APP_NAME}.log"))
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, home_relative: &str) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
