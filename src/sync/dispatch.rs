//! What each command does for each sync state.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::state::SyncState;

/// Dispatch policy of a traversal command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `check`: report only.
    Report,
    /// `sync`: bring both sides up to date without deleting anything.
    Reconcile,
    /// `purge`: like reconcile, but drop one-sided and private articles.
    Purge,
}

/// Resolution of `CONFLICT` (equal timestamps, different content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave both sides alone and report the conflict.
    Report,
    /// Upload the local article over the remote one.
    Upload,
}

impl Mode {
    /// Conflict policy when none is configured.
    #[must_use]
    pub const fn default_conflict_policy(self) -> ConflictPolicy {
        match self {
            Self::Purge => ConflictPolicy::Upload,
            Self::Report | Self::Reconcile => ConflictPolicy::Report,
        }
    }
}

/// Side effect chosen for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    None,
    /// PATCH, or POST and write the assigned id back.
    Upload,
    /// Overwrite (or create) the local file from Qiita.
    Download,
    DeleteLocal,
    DeleteRemote,
    /// Private article under purge: delete on Qiita (if uploaded) and locally.
    DeleteBoth,
}

/// Choose the action for `state`. `private` is the flag of the entry's
/// primary article and only matters for [`Mode::Purge`].
#[must_use]
pub const fn plan(mode: Mode, state: SyncState, private: bool, on_conflict: ConflictPolicy) -> Action {
    let conflict = match on_conflict {
        ConflictPolicy::Report => Action::None,
        ConflictPolicy::Upload => Action::Upload,
    };

    match mode {
        Mode::Report => Action::None,
        Mode::Reconcile => match state {
            SyncState::LocalOnly | SyncState::LocalNewer => Action::Upload,
            SyncState::RemoteOnly | SyncState::RemoteNewer => Action::Download,
            SyncState::RemoteDeleted | SyncState::InSync => Action::None,
            SyncState::Conflict => conflict,
        },
        Mode::Purge if private => Action::DeleteBoth,
        Mode::Purge => match state {
            SyncState::LocalOnly | SyncState::RemoteDeleted => Action::DeleteLocal,
            SyncState::RemoteOnly => Action::DeleteRemote,
            SyncState::LocalNewer => Action::Upload,
            SyncState::RemoteNewer => Action::Download,
            SyncState::InSync => Action::None,
            SyncState::Conflict => conflict,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SyncState; 7] = [
        SyncState::LocalOnly,
        SyncState::RemoteOnly,
        SyncState::LocalNewer,
        SyncState::RemoteNewer,
        SyncState::RemoteDeleted,
        SyncState::InSync,
        SyncState::Conflict,
    ];

    #[test]
    fn test_report_never_acts() {
        for state in ALL {
            for private in [false, true] {
                assert_eq!(plan(Mode::Report, state, private, ConflictPolicy::Upload), Action::None);
            }
        }
    }

    #[test]
    fn test_reconcile_table() {
        let p = |s| plan(Mode::Reconcile, s, true, ConflictPolicy::Report);
        assert_eq!(p(SyncState::LocalOnly), Action::Upload);
        assert_eq!(p(SyncState::RemoteOnly), Action::Download);
        assert_eq!(p(SyncState::LocalNewer), Action::Upload);
        assert_eq!(p(SyncState::RemoteNewer), Action::Download);
        assert_eq!(p(SyncState::RemoteDeleted), Action::None);
        assert_eq!(p(SyncState::InSync), Action::None);
        assert_eq!(p(SyncState::Conflict), Action::None);
        assert_eq!(
            plan(Mode::Reconcile, SyncState::Conflict, false, ConflictPolicy::Upload),
            Action::Upload
        );
    }

    #[test]
    fn test_purge_table() {
        let p = |s| plan(Mode::Purge, s, false, Mode::Purge.default_conflict_policy());
        assert_eq!(p(SyncState::LocalOnly), Action::DeleteLocal);
        assert_eq!(p(SyncState::RemoteOnly), Action::DeleteRemote);
        assert_eq!(p(SyncState::LocalNewer), Action::Upload);
        assert_eq!(p(SyncState::RemoteNewer), Action::Download);
        assert_eq!(p(SyncState::RemoteDeleted), Action::DeleteLocal);
        assert_eq!(p(SyncState::InSync), Action::None);
        assert_eq!(p(SyncState::Conflict), Action::Upload);
    }

    #[test]
    fn test_purge_private_overrides_state() {
        for state in ALL {
            assert_eq!(
                plan(Mode::Purge, state, true, ConflictPolicy::Report),
                Action::DeleteBoth
            );
        }
    }

    #[test]
    fn test_conflict_policy_names() {
        let policy: ConflictPolicy = serde_json::from_str(r#""upload""#).unwrap();
        assert_eq!(policy, ConflictPolicy::Upload);
        assert_eq!(Mode::Reconcile.default_conflict_policy(), ConflictPolicy::Report);
    }
}
