//! Collaborators backed by the local `git` client

use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::version::error::FetchError;
use crate::version::registries::git_command::{DEFAULT_GIT_TIMEOUT_SECS, GitCommand};
use crate::version::remote::{BranchContainment, ContainingBranches, RefLister};
use crate::version::types::{RemoteRef, RemoteRefs};

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";
const PEELED_SUFFIX: &str = "^{}";
const ORIGIN_PREFIX: &str = "refs/remotes/origin/";

/// Lists references with `git ls-remote --symref`
pub struct GitRefLister {
    timeout: Duration,
}

impl GitRefLister {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for GitRefLister {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS))
    }
}

#[async_trait::async_trait]
impl RefLister for GitRefLister {
    async fn list_refs(&self, url: &str) -> Result<RemoteRefs, FetchError> {
        let output = ls_remote_command(url)
            .timeout(self.timeout)
            .output()
            .await?;

        let refs = parse_ls_remote(&output);
        info!(
            "Listed {} references for {} (default branch: {:?})",
            refs.refs.len(),
            url,
            refs.default_branch
        );
        Ok(refs)
    }
}

/// Parse `git ls-remote --symref` output
///
/// ```text
/// ref: refs/heads/main	HEAD
/// 1111111111111111111111111111111111111111	refs/heads/main
/// 2222222222222222222222222222222222222222	refs/tags/v1.0.0
/// 3333333333333333333333333333333333333333	refs/tags/v1.0.0^{}
/// ```
///
/// Peeled `^{}` entries replace the annotated tag object with the commit it
/// points at. Other namespaces (pull requests, notes) are skipped.
pub fn parse_ls_remote(output: &str) -> RemoteRefs {
    let mut default_branch = None;
    let mut refs: IndexMap<(bool, String), String> = IndexMap::new();

    for line in output.lines() {
        let Some((left, right)) = line.split_once('\t') else {
            continue;
        };

        if let Some(target) = left.strip_prefix("ref: ") {
            if right == "HEAD" {
                default_branch = target.strip_prefix(HEADS_PREFIX).map(str::to_string);
            }
            continue;
        }

        let commit = left.trim().to_string();
        if let Some(branch) = right.strip_prefix(HEADS_PREFIX) {
            refs.insert((true, branch.to_string()), commit);
        } else if let Some(tag) = right.strip_prefix(TAGS_PREFIX) {
            if let Some(peeled) = tag.strip_suffix(PEELED_SUFFIX) {
                refs.insert((false, peeled.to_string()), commit);
            } else {
                refs.entry((false, tag.to_string())).or_insert(commit);
            }
        }
    }

    RemoteRefs {
        refs: refs
            .into_iter()
            .map(|((is_branch, name), target_commit)| RemoteRef {
                name,
                target_commit,
                is_branch,
            })
            .collect(),
        default_branch,
    }
}

/// Answers containment queries from a throwaway blobless clone
///
/// The clone lives in a temporary directory that is removed when the lookup
/// returns, whether it succeeded or not.
pub struct LocalGitContainment {
    timeout: Duration,
}

impl LocalGitContainment {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LocalGitContainment {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS))
    }
}

#[async_trait::async_trait]
impl BranchContainment for LocalGitContainment {
    async fn branches_containing(
        &self,
        url: &str,
        commit: &str,
    ) -> Result<ContainingBranches, FetchError> {
        let dir = tempfile::Builder::new()
            .prefix("action-update-checker-")
            .tempdir()?;
        let repo = dir.path().join("repo");
        let repo_arg = repo.to_string_lossy().into_owned();

        info!("Cloning {} to look up branches containing {}", url, commit);
        clone_command(url, &repo_arg)
            .timeout(self.timeout)
            .output()
            .await?;

        let branches = GitCommand::new([
            "branch",
            "--remotes",
            "--format=%(refname)",
            "--contains",
            commit,
        ])
        .current_dir(&repo)
        .timeout(self.timeout)
        .output()
        .await?;

        let origin_head = missing_ref_as_none(
            GitCommand::new(["symbolic-ref", "refs/remotes/origin/HEAD"])
                .current_dir(&repo)
                .timeout(self.timeout)
                .output()
                .await,
        )?;

        let containing = parse_containing_branches(&branches, origin_head.as_deref());
        debug!("{} is contained in {:?}", commit, containing.branches);
        Ok(containing)
    }
}

fn ls_remote_command(url: &str) -> GitCommand {
    GitCommand::new(["ls-remote", "--symref", "--", url])
}

fn clone_command(url: &str, dest: &str) -> GitCommand {
    GitCommand::new([
        "clone",
        "--quiet",
        "--no-checkout",
        "--filter=blob:none",
        "--",
        url,
        dest,
    ])
}

/// A failed git invocation means the ref is absent; timeouts and I/O errors propagate
fn missing_ref_as_none(result: Result<String, FetchError>) -> Result<Option<String>, FetchError> {
    match result {
        Ok(output) => Ok(Some(output)),
        Err(FetchError::Git { message, .. }) => {
            debug!("origin/HEAD is not set: {}", message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Parse `git branch --remotes --format=%(refname)` output
pub fn parse_containing_branches(output: &str, origin_head: Option<&str>) -> ContainingBranches {
    let mut branches: Vec<String> = output
        .lines()
        .filter_map(|line| line.trim().strip_prefix(ORIGIN_PREFIX))
        .filter(|name| *name != "HEAD")
        .map(str::to_string)
        .collect();
    branches.sort();
    branches.dedup();

    ContainingBranches {
        branches,
        default_branch: origin_head
            .and_then(|head| head.trim().strip_prefix(ORIGIN_PREFIX))
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LS_REMOTE: &str = "ref: refs/heads/main\tHEAD
1111111111111111111111111111111111111111\tHEAD
1111111111111111111111111111111111111111\trefs/heads/main
4444444444444444444444444444444444444444\trefs/heads/v2
2222222222222222222222222222222222222222\trefs/tags/v1.0.0
3333333333333333333333333333333333333333\trefs/tags/v1.0.0^{}
5555555555555555555555555555555555555555\trefs/tags/v2
6666666666666666666666666666666666666666\trefs/pull/1/head
";

    #[test]
    fn parse_ls_remote_reads_heads_tags_and_default() {
        let refs = parse_ls_remote(LS_REMOTE);

        assert_eq!(refs.default_branch.as_deref(), Some("main"));
        assert_eq!(
            refs.refs,
            vec![
                RemoteRef::branch("main", "1111111111111111111111111111111111111111"),
                RemoteRef::branch("v2", "4444444444444444444444444444444444444444"),
                RemoteRef::tag("v1.0.0", "3333333333333333333333333333333333333333"),
                RemoteRef::tag("v2", "5555555555555555555555555555555555555555"),
            ]
        );
    }

    #[test]
    fn parse_ls_remote_handles_peeled_entry_first() {
        let refs = parse_ls_remote(
            "3333333333333333333333333333333333333333\trefs/tags/v1^{}
2222222222222222222222222222222222222222\trefs/tags/v1
",
        );

        assert_eq!(
            refs.refs,
            vec![RemoteRef::tag("v1", "3333333333333333333333333333333333333333")]
        );
        assert_eq!(refs.default_branch, None);
    }

    #[test]
    fn parse_containing_branches_strips_remote_prefix() {
        let containing = parse_containing_branches(
            "refs/remotes/origin/HEAD\nrefs/remotes/origin/production\nrefs/remotes/origin/3.3-stable\n",
            Some("refs/remotes/origin/main\n"),
        );

        assert_eq!(containing.branches, vec!["3.3-stable", "production"]);
        assert_eq!(containing.default_branch.as_deref(), Some("main"));
    }

    #[test]
    fn url_is_passed_after_option_terminator() {
        let url = "--upload-pack=touch /tmp/pwned";

        assert_eq!(
            ls_remote_command(url).args(),
            ["ls-remote", "--symref", "--", url]
        );
        assert_eq!(
            clone_command(url, "/tmp/repo").args()[4..],
            ["--", url, "/tmp/repo"]
        );
    }

    #[test]
    fn missing_origin_head_is_none_but_timeout_propagates() {
        let git_failure = Err(FetchError::Git {
            command: "symbolic-ref".to_string(),
            message: "ref refs/remotes/origin/HEAD is not a symbolic ref".to_string(),
        });
        let timeout = Err(FetchError::Timeout {
            command: "symbolic-ref".to_string(),
            secs: 300,
        });

        assert_eq!(missing_ref_as_none(git_failure).unwrap(), None);
        assert_eq!(
            missing_ref_as_none(Ok("refs/remotes/origin/main\n".to_string())).unwrap(),
            Some("refs/remotes/origin/main\n".to_string())
        );
        assert!(matches!(
            missing_ref_as_none(timeout),
            Err(FetchError::Timeout { secs: 300, .. })
        ));
    }

    #[test]
    fn parse_containing_branches_without_origin_head() {
        let containing = parse_containing_branches("", None);

        assert_eq!(containing, ContainingBranches::default());
    }
}
