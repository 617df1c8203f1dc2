//! Configuration management.
//!
//! Each setting is resolved in priority order:
//!
//! 1. CLI flag
//! 2. Environment variable
//! 3. `.qiita-sync.json` at the repository root
//! 4. Built-in default
//!
//! Environment access goes through a lookup function so resolution can be
//! exercised without touching the process environment.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::{RetryPolicy, DEFAULT_ENDPOINT, DEFAULT_PER_PAGE};
use crate::context::Hosts;
use crate::discover::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
use crate::error::{Error, Result};
use crate::sync::ConflictPolicy;

/// Project configuration file name, at the repository root.
pub const CONFIG_FILE: &str = ".qiita-sync.json";

/// Default token file name, relative to the repository root.
pub const DEFAULT_TOKEN_FILE: &str = "access_token.txt";

/// Access token fallback when no token file exists.
pub const ACCESS_TOKEN_ENV: &str = "QIITA_ACCESS_TOKEN";

/// Ref name used when HEAD is detached. Its presence also switches local
/// timestamps to commit times.
pub const GITHUB_REF_ENV: &str = "GITHUB_REF";

/// Override for the API base URL.
pub const API_ENDPOINT_ENV: &str = "QSYNC_API_ENDPOINT";

/// Contents of `.qiita-sync.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub api_endpoint: Option<String>,
    pub article_host: Option<String>,
    pub content_host: Option<String>,
    pub git_host: Option<String>,
    pub token_file: Option<PathBuf>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub per_page: Option<u32>,
    pub max_retries: Option<u32>,
    pub on_conflict: Option<ConflictPolicy>,
}

impl ProjectConfig {
    /// Load `CONFIG_FILE` from `topdir`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file exists but cannot be read or parsed.
    pub fn load(topdir: &Path) -> Result<Self> {
        let path = topdir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "Loading project config");
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))
    }
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token_file: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub vcs_timestamp: bool,
    pub on_conflict: Option<ConflictPolicy>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_endpoint: String,
    pub hosts: Hosts,
    /// Absolute path of the token file.
    pub token_file: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub per_page: u32,
    pub retry: RetryPolicy,
    /// `None` leaves the choice to the command.
    pub on_conflict: Option<ConflictPolicy>,
    /// Compare local commit times instead of file mtimes.
    pub vcs_timestamp: bool,
    /// Ref used when HEAD is detached.
    pub fallback_ref: Option<String>,
}

impl Settings {
    /// Resolve against the process environment and `topdir`'s config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the project config file is invalid.
    pub fn load(topdir: &Path, overrides: &Overrides) -> Result<Self> {
        let project = ProjectConfig::load(topdir)?;
        Ok(Self::resolve(topdir, overrides, &project, |key| std::env::var(key).ok()))
    }

    /// Merge the layers.
    pub fn resolve<E>(topdir: &Path, overrides: &Overrides, project: &ProjectConfig, env: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Hosts::default();
        let fallback_ref = env(GITHUB_REF_ENV).filter(|r| !r.is_empty());

        let token_file = overrides
            .token_file
            .clone()
            .or_else(|| project.token_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        Self {
            api_endpoint: env(API_ENDPOINT_ENV)
                .filter(|e| !e.is_empty())
                .or_else(|| project.api_endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            hosts: Hosts {
                article: project.article_host.clone().unwrap_or(defaults.article),
                content: project.content_host.clone().unwrap_or(defaults.content),
                git: project.git_host.clone().unwrap_or(defaults.git),
            },
            token_file: topdir.join(token_file),
            include: pick_patterns(&overrides.include, project.include.as_ref(), DEFAULT_INCLUDE),
            exclude: pick_patterns(&overrides.exclude, project.exclude.as_ref(), DEFAULT_EXCLUDE),
            per_page: project.per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE),
            retry: RetryPolicy {
                max_retries: project.max_retries.unwrap_or(RetryPolicy::default().max_retries),
                ..RetryPolicy::default()
            },
            on_conflict: overrides.on_conflict.or(project.on_conflict),
            vcs_timestamp: overrides.vcs_timestamp || fallback_ref.is_some(),
            fallback_ref,
        }
    }

    /// Read the access token: token file first, then `QIITA_ACCESS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if neither provides a token.
    pub fn access_token<E>(&self, env: E) -> Result<String>
    where
        E: Fn(&str) -> Option<String>,
    {
        if self.token_file.is_file() {
            let token = fs::read_to_string(&self.token_file)?.trim().to_string();
            if !token.is_empty() {
                debug!(path = %self.token_file.display(), "Using token file");
                return Ok(token);
            }
        }

        env(ACCESS_TOKEN_ENV)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no Qiita access token ({} not found and {ACCESS_TOKEN_ENV} is not set)",
                    self.token_file.display()
                ))
            })
    }
}

fn pick_patterns(cli: &[String], project: Option<&Vec<String>>, defaults: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    project
        .cloned()
        .unwrap_or_else(|| defaults.iter().map(ToString::to_string).collect())
}
