use thiserror::Error;

/// Failures raised by the collaborators that fetch remote state
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("git {command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of an update check
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("All versions of {dependency} are ignored")]
    AllVersionsIgnored { dependency: String },

    #[error("Commit {commit} is contained in multiple branches: {}", branches.join(", "))]
    AmbiguousBranches {
        commit: String,
        branches: Vec<String>,
    },

    #[error("Invalid ignore constraint '{constraint}': {source}")]
    InvalidIgnoreConstraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid advisory range '{range}': {source}")]
    InvalidAdvisoryRange {
        range: String,
        #[source]
        source: semver::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_branches_lists_every_branch() {
        let err = CheckError::AmbiguousBranches {
            commit: "abc1234".to_string(),
            branches: vec!["3.3-stable".to_string(), "production".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "Commit abc1234 is contained in multiple branches: 3.3-stable, production"
        );
    }

    #[test]
    fn fetch_error_is_passed_through_transparently() {
        let err: CheckError = FetchError::NotFound("actions/checkout".to_string()).into();

        assert_eq!(err.to_string(), "Repository not found: actions/checkout");
    }
}
