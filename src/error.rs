//! Error types for Qiita Sync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Every error is caught in `main` and printed; the process exits with a
//! single failure code regardless of the error kind.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Qiita Sync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigError,
    CommandFailed,
    ItemNotFound,
    HttpError,
    TransportError,
    RateLimited,
    MissingId,
    InvalidTarget,
    FileExists,
    IoError,
    JsonError,
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::CommandFailed => "COMMAND_FAILED",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::HttpError => "HTTP_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::MissingId => "MISSING_ID",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::FileExists => "FILE_EXISTS",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure is scoped to one article.
    ///
    /// Batch commands record these in the per-article report and keep going;
    /// everything else aborts the remaining work.
    #[must_use]
    pub const fn is_per_article(&self) -> bool {
        matches!(self, Self::ItemNotFound | Self::MissingId | Self::FileExists)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Qiita Sync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{command} => {} ({stderr})", .status.map_or_else(|| "signal".to_string(), |s| s.to_string()))]
    Command {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{id} not found in Qiita")]
    ItemNotFound { id: String },

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Rate limited by {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("{} has no id", .path.display())]
    MissingId { path: PathBuf },

    #[error("{} does not exist", .path.display())]
    InvalidTarget { path: PathBuf },

    #[error("{} already exists", .path.display())]
    FileExists { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::Glob(_) => ErrorCode::ConfigError,
            Self::Command { .. } => ErrorCode::CommandFailed,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::Http { .. } => ErrorCode::HttpError,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::MissingId { .. } => ErrorCode::MissingId,
            Self::InvalidTarget { .. } => ErrorCode::InvalidTarget,
            Self::FileExists { .. } => ErrorCode::FileExists,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether batch commands should record this error and continue.
    #[must_use]
    pub const fn is_per_article(&self) -> bool {
        self.error_code().is_per_article()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(msg) if msg.contains("access token") => Some(
                "Put the token in access_token.txt at the repository root, \
                 pass --token <file>, or export QIITA_ACCESS_TOKEN"
                    .to_string(),
            ),
            Self::Config(msg) if msg.contains("branch") => Some(
                "HEAD is detached. Check out a branch or set GITHUB_REF (e.g. refs/heads/main)"
                    .to_string(),
            ),
            Self::Config(msg) if msg.contains("remote") => Some(
                "`git config --get remote.origin.url` must point at a GitHub repository".to_string(),
            ),
            Self::ItemNotFound { id } => Some(format!(
                "The article {id} was deleted on Qiita. Remove the `id:` line to upload it again."
            )),
            Self::MissingId { .. } => {
                Some("Only uploaded articles (with an `id:` header line) can be deleted".to_string())
            }
            Self::FileExists { path } => Some(format!(
                "Rename or remove {} and run the command again",
                path.display()
            )),
            Self::RateLimited { .. } => {
                Some("Raise `max_retries` in .qiita-sync.json or try again later".to_string())
            }
            Self::Command { command, .. } if command.starts_with("git") => {
                Some("Run qsync inside a git working tree".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
