//! Sync engine: traversal, dispatch, and side effects.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::diff::unified_diff;
use super::dispatch::{plan, Action, ConflictPolicy, Mode};
use super::local::LocalArticles;
use super::report::{ReportEntry, SyncReport};
use super::state::{classify, SyncEntry, SyncState};
use super::translate::Translator;
use crate::api::{fetch_all_items, ArticleApi};
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::model::{Article, NATIVE_LINE_ENDING};

/// Runs commands for one repository against one Qiita account.
pub struct Engine<'a, A: ArticleApi> {
    api: &'a A,
    ctx: &'a RepoContext,
    locals: &'a LocalArticles,
    per_page: u32,
}

impl<'a, A: ArticleApi> Engine<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, ctx: &'a RepoContext, locals: &'a LocalArticles, per_page: u32) -> Self {
        Self {
            api,
            ctx,
            locals,
            per_page,
        }
    }

    fn translator(&self) -> Translator<'a> {
        Translator::new(self.ctx, self.locals)
    }

    // ── Traversal ─────────────────────────────────────────────

    /// Classify every article in scope.
    ///
    /// At the repository root the full item list is fetched once and
    /// Qiita-only items are included. Below it, each local article with an
    /// id is looked up individually.
    ///
    /// # Errors
    ///
    /// Returns the first API error.
    pub async fn classify_target(&self, target: &Path) -> Result<Vec<SyncEntry>> {
        let translator = self.translator();
        let mut entries = Vec::new();

        if target == self.ctx.topdir {
            let remotes: Vec<Article> = fetch_all_items(self.api, self.per_page)
                .await?
                .iter()
                .map(Article::from_remote)
                .collect();

            for local in self.locals.articles() {
                let remote = local
                    .id()
                    .and_then(|id| remotes.iter().find(|r| r.id() == Some(id)));
                entries.push(SyncEntry {
                    state: classify(local, remote, &translator),
                    local: Some(local.clone()),
                    remote: remote.cloned(),
                });
            }

            for remote in remotes {
                if remote.id().and_then(|id| self.locals.by_id(id)).is_none() {
                    entries.push(SyncEntry::remote_only(remote));
                }
            }
        } else {
            for local in self.locals.under(target) {
                let remote = match local.id() {
                    Some(id) => self.api.get_item(id).await?.map(|item| Article::from_remote(&item)),
                    None => None,
                };
                entries.push(SyncEntry {
                    state: classify(local, remote.as_ref(), &translator),
                    local: Some(local.clone()),
                    remote,
                });
            }
        }

        Ok(entries)
    }

    /// Classify and dispatch every article in scope.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not scoped to a single article.
    pub async fn run(&self, mode: Mode, target: &Path, on_conflict: ConflictPolicy) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for entry in self.classify_target(target).await? {
            let private = entry.primary().is_some_and(|a| a.metadata.private);
            let action = plan(mode, entry.state, private, on_conflict);
            let Some(line) = self.describe(&entry, action, mode == Mode::Report) else {
                continue;
            };
            debug!(title = %line.title, state = %entry.state, ?action, "Dispatching");

            let outcome = self.apply(action, &entry).await;
            record(&mut report, line, outcome)?;
        }

        Ok(report)
    }

    /// Report the state of every article in scope.
    ///
    /// # Errors
    ///
    /// Returns the first API error.
    pub async fn check(&self, target: &Path) -> Result<SyncReport> {
        self.run(Mode::Report, target, ConflictPolicy::Report).await
    }

    /// Bring local files and Qiita up to date with each other.
    ///
    /// # Errors
    ///
    /// Returns the first error not scoped to one article.
    pub async fn sync(&self, target: &Path, on_conflict: ConflictPolicy) -> Result<SyncReport> {
        self.run(Mode::Reconcile, target, on_conflict).await
    }

    /// Sync, then drop one-sided and private articles.
    ///
    /// # Errors
    ///
    /// Returns the first error not scoped to one article.
    pub async fn purge(&self, target: &Path, on_conflict: ConflictPolicy) -> Result<SyncReport> {
        self.run(Mode::Purge, target, on_conflict).await
    }

    fn describe(&self, entry: &SyncEntry, action: Action, with_diff: bool) -> Option<ReportEntry> {
        let mut line = ReportEntry::new(entry.primary()?, Some(entry.state), action);

        if let (Some(local), Some(remote)) = (&entry.local, &entry.remote) {
            match entry.state {
                SyncState::LocalNewer => line.timestamp = Some(local.timestamp),
                SyncState::RemoteNewer => line.timestamp = Some(remote.timestamp),
                _ => {}
            }
            if with_diff && line.timestamp.is_some() {
                let translator = self.translator();
                let local_form = translator.to_local(local);
                let remote_form = translator.to_local(&remote.clone().with_path(local.path.clone()));
                line.diff = Some(unified_diff(&local_form.body, &remote_form.body));
            }
        }

        Some(line)
    }

    async fn apply(&self, action: Action, entry: &SyncEntry) -> Result<()> {
        let local = entry.local.as_ref();
        let remote = entry.remote.as_ref();

        match action {
            Action::None => {}
            Action::Upload => {
                if let Some(local) = local {
                    self.upload_article(local).await?;
                }
            }
            Action::Download => {
                if let Some(remote) = remote {
                    let path = local.and_then(|l| l.path.clone());
                    self.save(&remote.clone().with_path(path))?;
                }
            }
            Action::DeleteLocal => {
                if let Some(path) = local.and_then(|l| l.path.as_deref()) {
                    remove_local(path)?;
                }
            }
            Action::DeleteRemote => {
                if let Some(id) = remote.and_then(Article::id) {
                    self.api.delete_item(id).await?;
                    info!(id, "Deleted from Qiita");
                }
            }
            Action::DeleteBoth => {
                let Some(article) = entry.primary() else {
                    return Ok(());
                };
                if let Some(id) = article.id() {
                    match self.api.delete_item(id).await {
                        Ok(()) => info!(id, "Deleted from Qiita"),
                        Err(Error::ItemNotFound { .. }) => debug!(id, "Already gone from Qiita"),
                        Err(e) => return Err(e),
                    }
                }
                if let Some(path) = article.path.as_deref() {
                    remove_local(path)?;
                }
            }
        }

        Ok(())
    }

    // ── Side effects ──────────────────────────────────────────

    /// Upload `local` in global form. A new article is created on Qiita and
    /// its file rewritten with the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if an existing id is unknown to Qiita, or any
    /// other API or write error.
    pub async fn upload_article(&self, local: &Article) -> Result<()> {
        let payload = self.translator().to_global(local).to_payload();

        match local.id() {
            Some(id) => {
                self.api.update_item(id, &payload).await?;
                info!(id, title = %local.metadata.title, "Updated on Qiita");
            }
            None => {
                let created = Article::from_remote(&self.api.create_item(&payload).await?);
                info!(id = ?created.id(), title = %created.metadata.title, "Created on Qiita");
                let saved = local
                    .clone()
                    .with_metadata(created.metadata)
                    .with_timestamp(created.timestamp);
                self.save(&saved)?;
            }
        }

        Ok(())
    }

    /// Write `article` in local form to its path, or to a new
    /// `<topdir>/<id>.md`.
    ///
    /// # Errors
    ///
    /// Returns `FileExists` if an article without a path would replace an
    /// existing file, or an error if the file cannot be written.
    pub fn save(&self, article: &Article) -> Result<PathBuf> {
        let path = match &article.path {
            Some(path) => path.clone(),
            None => {
                let path = self
                    .ctx
                    .topdir
                    .join(format!("{}.md", article.id().unwrap_or("unknown")));
                if path.exists() {
                    return Err(Error::FileExists { path });
                }
                path
            }
        };
        let local = self
            .translator()
            .to_local(&article.clone().with_path(Some(path.clone())));

        let mut text = local.to_text();
        if !text.ends_with('\n') {
            text.push_str(NATIVE_LINE_ENDING);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        info!(path = %path.display(), "Wrote local article");

        Ok(path)
    }

    // ── Transfer commands ─────────────────────────────────────

    /// Overwrite local articles in scope with their Qiita versions.
    ///
    /// # Errors
    ///
    /// Returns the first error not scoped to one article.
    pub async fn download(&self, target: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for local in self.locals.under(target) {
            let Some(id) = local.id() else {
                debug!(path = ?local.path, "Skipping article without id");
                continue;
            };
            let line = ReportEntry::new(local, None, Action::Download);
            let outcome = match self.api.get_item(id).await? {
                Some(item) => self
                    .save(&Article::from_remote(&item).with_path(local.path.clone()))
                    .map(|_| ()),
                None => Err(Error::ItemNotFound { id: id.to_string() }),
            };
            record(&mut report, line, outcome)?;
        }

        Ok(report)
    }

    /// Upload every local article in scope.
    ///
    /// # Errors
    ///
    /// Returns the first error not scoped to one article.
    pub async fn upload(&self, target: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for local in self.locals.under(target) {
            let line = ReportEntry::new(local, None, Action::Upload);
            let outcome = self.upload_article(local).await;
            record(&mut report, line, outcome)?;
        }

        Ok(report)
    }

    /// Delete the Qiita items of every local article in scope. Local files
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns the first error not scoped to one article.
    pub async fn delete(&self, target: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for local in self.locals.under(target) {
            let line = ReportEntry::new(local, None, Action::DeleteRemote);
            let outcome = match local.id() {
                Some(id) => self.api.delete_item(id).await,
                None => Err(Error::MissingId {
                    path: local.path.clone().unwrap_or_default(),
                }),
            };
            record(&mut report, line, outcome)?;
        }

        Ok(report)
    }
}

fn remove_local(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    info!(path = %path.display(), "Deleted local article");
    Ok(())
}

/// Add `line` to the report, attaching a per-article failure. Other
/// failures abort the command.
fn record(report: &mut SyncReport, mut line: ReportEntry, outcome: Result<()>) -> Result<()> {
    if let Err(e) = outcome {
        if !e.is_per_article() {
            return Err(e);
        }
        warn!(title = %line.title, error = %e, "Article failed");
        line.error = Some(e.to_string());
    }
    report.entries.push(line);
    Ok(())
}
