//! Version resolution for git-pinned action dependencies
//!
//! This module determines whether a dependency pinned to a tag, a branch or a
//! raw commit has a newer version, and how every declaration of it should be
//! re-pinned.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  RefLister  │────▶│   Catalog   │────▶│  Resolver   │
//! │ (ls-remote) │     │ (snapshot)  │     │ (tag search)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//! ┌─────────────┐     ┌─────────────┐            ▼
//! │ Comparator/ │────▶│ Commit pin  │     ┌─────────────┐
//! │ Containment │     │  resolver   │────▶│  Rewriter   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`classifier`]: Parses references into versions and recognises commit SHAs
//! - [`catalog`]: Immutable snapshot of a repository's tags and branches
//! - [`pin`]: Classification of a pinned reference against the catalog
//! - [`ignore`]: Ignored-version constraints
//! - [`resolver`]: Best upgrade tag at the current pin's precision
//! - [`commit_pin`]: Release- and branch-relative resolution of commit pins
//! - [`rewriter`]: Consistent re-pinning of every declaration
//! - [`security`]: Advisories and the lowest non-vulnerable upgrade
//! - [`checker`]: The `UpdateChecker` facade
//! - [`remote`]: Collaborator traits
//! - [`registries`]: Collaborators backed by git and the GitHub API
//! - [`error`]: Error types
//! - [`types`]: Dependency and requirement shapes

pub mod catalog;
pub mod checker;
pub mod classifier;
pub mod commit_pin;
pub mod error;
pub mod ignore;
pub mod pin;
pub mod registries;
pub mod remote;
pub mod resolver;
pub mod rewriter;
pub mod security;
pub mod types;

pub use checker::{CheckOptions, Collaborators, RequirementsToUnlock, UpdateChecker};
pub use error::{CheckError, FetchError};
pub use resolver::{Resolution, ResolvedTarget};
pub use types::{Dependency, GitSource, Requirement, RequirementMetadata};
