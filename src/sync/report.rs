//! Per-article outcome of a command.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::dispatch::Action;
use super::state::SyncState;
use crate::model::Article;

/// One line of command output.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Absent for plain transfer commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SyncState>,
    pub action: Action,
    pub title: String,
    pub path: Option<PathBuf>,
    pub id: Option<String>,
    /// Timestamp of the newer side, for `LOCAL_NEWER`/`REMOTE_NEWER`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEntry {
    #[must_use]
    pub fn new(article: &Article, state: Option<SyncState>, action: Action) -> Self {
        Self {
            state,
            action,
            title: article.metadata.title.clone(),
            path: article.path.clone(),
            id: article.metadata.id.clone(),
            timestamp: None,
            diff: None,
            error: None,
        }
    }

    fn label(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| self.id.clone())
            .unwrap_or_default()
    }

    fn timestamp_str(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S%.6f%z").to_string())
            .unwrap_or_default()
    }

    /// Human-readable status line.
    #[must_use]
    pub fn summary(&self) -> String {
        let title = &self.title;
        let id = self.id.as_deref().unwrap_or_default();

        if let Some(error) = &self.error {
            return format!("{title}({}) => {error}", self.label());
        }

        match self.state {
            Some(SyncState::LocalOnly) => format!("{title}({}) :: Local Only", self.label()),
            Some(SyncState::RemoteOnly) => format!("{title}({id}) :: Qiita Only"),
            Some(SyncState::LocalNewer) => {
                format!("{title} => Local is new ({})", self.timestamp_str())
            }
            Some(SyncState::RemoteNewer) => {
                format!("{title} => Qiita is new ({})", self.timestamp_str())
            }
            Some(SyncState::RemoteDeleted) => format!("{title}({id}) => Not found in Qiita"),
            Some(SyncState::InSync) => format!("{title} :: In Sync"),
            Some(SyncState::Conflict) => format!("{title} => Conflict"),
            None => format!("{title}({}) => {}", self.label(), action_verb(self.action)),
        }
    }
}

const fn action_verb(action: Action) -> &'static str {
    match action {
        Action::None => "skipped",
        Action::Upload => "uploaded",
        Action::Download => "downloaded",
        Action::DeleteLocal => "deleted locally",
        Action::DeleteRemote => "deleted from Qiita",
        Action::DeleteBoth => "deleted",
    }
}

/// Result of a command over a set of articles.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SyncReport {
    pub entries: Vec<ReportEntry>,
}

impl SyncReport {
    /// Entries worth showing: everything except untouched in-sync articles.
    pub fn notable(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.error.is_some() || e.state != Some(SyncState::InSync))
    }

    /// Number of per-article failures.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }
}
