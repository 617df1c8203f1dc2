//! Sync state classification.

use serde::Serialize;
use std::fmt;

use super::translate::Translator;
use crate::model::Article;

/// Relationship between a local article and its Qiita counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// Never uploaded (no id).
    LocalOnly,
    /// On Qiita with no local file.
    RemoteOnly,
    LocalNewer,
    RemoteNewer,
    /// Has an id Qiita no longer knows.
    RemoteDeleted,
    InSync,
    /// Same timestamp, different content.
    Conflict,
}

impl SyncState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LocalOnly => "LOCAL_ONLY",
            Self::RemoteOnly => "REMOTE_ONLY",
            Self::LocalNewer => "LOCAL_NEWER",
            Self::RemoteNewer => "REMOTE_NEWER",
            Self::RemoteDeleted => "REMOTE_DELETED",
            Self::InSync => "IN_SYNC",
            Self::Conflict => "CONFLICT",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified pairing. At least one side is always present.
#[derive(Debug, Clone)]
pub struct SyncEntry {
    pub state: SyncState,
    pub local: Option<Article>,
    /// As decoded from Qiita, without a local path.
    pub remote: Option<Article>,
}

impl SyncEntry {
    #[must_use]
    pub fn remote_only(remote: Article) -> Self {
        Self {
            state: SyncState::RemoteOnly,
            local: None,
            remote: Some(remote),
        }
    }

    /// The article the entry is about: local if present.
    #[must_use]
    pub fn primary(&self) -> Option<&Article> {
        self.local.as_ref().or(self.remote.as_ref())
    }
}

/// Compare a local article with the result of looking up its id on Qiita.
///
/// Content is compared in local form, with the remote article placed at the
/// local file's path. Equal content is `InSync` whatever the timestamps say.
#[must_use]
pub fn classify(local: &Article, remote: Option<&Article>, translator: &Translator<'_>) -> SyncState {
    if local.id().is_none() {
        return SyncState::LocalOnly;
    }
    let Some(remote) = remote else {
        return SyncState::RemoteDeleted;
    };

    let local_form = translator.to_local(local);
    let remote_form = translator.to_local(&remote.clone().with_path(local.path.clone()));

    if local_form == remote_form {
        SyncState::InSync
    } else if local.timestamp > remote.timestamp {
        SyncState::LocalNewer
    } else if local.timestamp < remote.timestamp {
        SyncState::RemoteNewer
    } else {
        SyncState::Conflict
    }
}
