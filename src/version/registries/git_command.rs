//! Minimal runner for `git` subprocesses with a timeout

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::version::error::FetchError;

/// Default timeout for git operations (5 minutes)
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 300;

pub struct GitCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Duration,
}

impl GitCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
            timeout_duration: Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS),
        }
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = duration;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn name(&self) -> String {
        self.args.first().cloned().unwrap_or_default()
    }

    /// Runs the command and returns stdout, failing on a non-zero exit
    pub async fn output(self) -> Result<String, FetchError> {
        let mut cmd = Command::new("git");
        cmd.args(&self.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        debug!("Running git {}", self.args.join(" "));

        let output = timeout(self.timeout_duration, cmd.output())
            .await
            .map_err(|_| FetchError::Timeout {
                command: self.name(),
                secs: self.timeout_duration.as_secs(),
            })??;

        if !output.status.success() {
            return Err(FetchError::Git {
                command: self.name(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
