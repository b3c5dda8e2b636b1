//! Concrete collaborators for listing references, comparing releases and
//! looking up branch containment

pub mod git;
pub mod git_command;
pub mod github;

pub use git::{GitRefLister, LocalGitContainment};
pub use github::GitHubComparator;
