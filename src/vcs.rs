//! Version-control collaborator.
//!
//! The sync engine only needs four facts from git: the working-tree root,
//! the origin URL, the current branch, and when a file last changed. They
//! are read by shelling out to `git`, the same way the rest of the CLI
//! talks to git.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{FileMtime, TimestampSource};

/// Ref name git reports for a detached HEAD.
pub const DETACHED_HEAD: &str = "HEAD";

/// Source of repository metadata.
pub trait Vcs {
    /// Absolute path of the working-tree root.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn topdir(&self) -> Result<PathBuf>;

    /// URL of the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn remote_url(&self) -> Result<String>;

    /// Current branch name, or [`DETACHED_HEAD`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn current_ref(&self) -> Result<String>;

    /// Commit time of the last change to `path` reachable from `rev`.
    /// `None` for files with no history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn commit_timestamp(&self, path: &Path, rev: &str) -> Result<Option<DateTime<Utc>>>;
}

/// `git` subprocess implementation.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Run git commands from `workdir`. A file path uses its parent.
    #[must_use]
    pub fn new(workdir: &Path) -> Self {
        let workdir = if workdir.is_file() {
            workdir.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        } else {
            workdir.to_path_buf()
        };
        Self { workdir }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, workdir = %self.workdir.display(), "Running");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| Error::Command {
                command: command.clone(),
                status: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn topdir(&self) -> Result<PathBuf> {
        self.run(&["rev-parse", "--show-toplevel"]).map(PathBuf::from)
    }

    fn remote_url(&self) -> Result<String> {
        self.run(&["config", "--get", "remote.origin.url"])
    }

    fn current_ref(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn commit_timestamp(&self, path: &Path, rev: &str) -> Result<Option<DateTime<Utc>>> {
        let path = path.to_string_lossy();
        let stdout = self.run(&["log", "-1", "--pretty=%cI", rev, "--", &path])?;
        if stdout.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&stdout)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|e| Error::Other(format!("Unexpected git timestamp {stdout:?}: {e}")))
    }
}

/// Timestamps from commit history, falling back to mtime for files git
/// has never seen.
pub struct CommitTimestamps<'a> {
    vcs: &'a dyn Vcs,
    rev: String,
}

impl<'a> CommitTimestamps<'a> {
    /// Compare against `origin/<branch>`, or `HEAD` when detached.
    #[must_use]
    pub fn new(vcs: &'a dyn Vcs, current_ref: &str, branch: &str) -> Self {
        let rev = if current_ref == DETACHED_HEAD {
            DETACHED_HEAD.to_string()
        } else {
            format!("origin/{branch}")
        };
        Self { vcs, rev }
    }
}

impl TimestampSource for CommitTimestamps<'_> {
    fn timestamp(&self, path: &Path) -> Result<DateTime<Utc>> {
        match self.vcs.commit_timestamp(path, &self.rev)? {
            Some(ts) => Ok(ts),
            None => FileMtime.timestamp(path),
        }
    }
}
