//! Article commands: `download`, `upload`, `check`, `delete`, `sync`, `purge`.
//!
//! Each run resolves the repository, settings and token, loads the local
//! articles under the repository root, then hands the target to the engine.

use colored::{ColoredString, Colorize};
use tracing::{debug, info};

use crate::api::QiitaClient;
use crate::cli::TargetArgs;
use crate::config::{Overrides, Settings};
use crate::context::RepoContext;
use crate::discover::{discover, FileFilter};
use crate::error::{Error, Result};
use crate::model::FileMtime;
use crate::sync::{ConflictPolicy, Engine, LocalArticles, Mode, ReportEntry, SyncReport, SyncState};
use crate::vcs::{CommitTimestamps, GitCli, Vcs};

/// Which article command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Download,
    Upload,
    Check,
    Delete,
    Sync(Option<ConflictPolicy>),
    Purge(Option<ConflictPolicy>),
}

impl Operation {
    const fn on_conflict(self) -> Option<ConflictPolicy> {
        match self {
            Self::Sync(policy) | Self::Purge(policy) => policy,
            _ => None,
        }
    }
}

/// Execute an article command.
///
/// # Errors
///
/// Returns configuration, git and API errors that abort the run.
/// Per-article failures are printed with the report instead.
pub fn execute(op: Operation, args: &TargetArgs, json: bool) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    let report = rt.block_on(run(op, args))?;
    print_report(op, &report, json)
}

async fn run(op: Operation, args: &TargetArgs) -> Result<SyncReport> {
    let target = args
        .target
        .canonicalize()
        .map_err(|_| Error::InvalidTarget { path: args.target.clone() })?;

    let vcs = GitCli::new(&target);
    let topdir = vcs.topdir()?;
    let topdir = topdir.canonicalize().unwrap_or(topdir);

    let overrides = Overrides {
        token_file: args.token.clone(),
        include: args.include.clone(),
        exclude: args.exclude.clone(),
        vcs_timestamp: args.vcs_timestamp,
        on_conflict: op.on_conflict(),
    };
    let settings = Settings::load(&topdir, &overrides)?;
    let token = settings.access_token(|key| std::env::var(key).ok())?;
    let client = QiitaClient::new(&settings.api_endpoint, &token, settings.retry);

    let ctx = RepoContext::resolve(
        topdir,
        &vcs,
        &client,
        settings.hosts.clone(),
        settings.fallback_ref.as_deref(),
    )
    .await?;

    let filter = FileFilter::new(&settings.include, &settings.exclude)?;
    let files = discover(&ctx.topdir, &filter)?;
    debug!(count = files.len(), "Discovered article files");

    let locals = if settings.vcs_timestamp {
        LocalArticles::load(files, &CommitTimestamps::new(&vcs, &ctx.current_ref, &ctx.branch))?
    } else {
        LocalArticles::load(files, &FileMtime)?
    };

    let engine = Engine::new(&client, &ctx, &locals, settings.per_page);
    info!(path = %target.display(), ?op, "Running");

    let policy = |mode: Mode| settings.on_conflict.unwrap_or(mode.default_conflict_policy());
    match op {
        Operation::Download => engine.download(&target).await,
        Operation::Upload => engine.upload(&target).await,
        Operation::Check => engine.check(&target).await,
        Operation::Delete => engine.delete(&target).await,
        Operation::Sync(_) => engine.sync(&target, policy(Mode::Reconcile)).await,
        Operation::Purge(_) => engine.purge(&target, policy(Mode::Purge)).await,
    }
}

fn print_report(op: Operation, report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for entry in report.notable() {
        println!("{}", styled(entry));
        if op == Operation::Check {
            if let Some(diff) = entry.diff.as_deref().filter(|d| !d.is_empty()) {
                print!("{diff}");
            }
        }
    }

    let failed = report.error_count();
    if failed > 0 {
        eprintln!("{}", format!("{failed} article(s) failed").red());
    }
    Ok(())
}

fn styled(entry: &ReportEntry) -> ColoredString {
    let line = entry.summary();
    if entry.error.is_some() {
        return line.red();
    }
    match entry.state {
        Some(SyncState::LocalOnly | SyncState::LocalNewer) => line.green(),
        Some(SyncState::RemoteOnly | SyncState::RemoteNewer) => line.cyan(),
        Some(SyncState::RemoteDeleted | SyncState::Conflict) => line.yellow(),
        Some(SyncState::InSync) | None => line.normal(),
    }
}
