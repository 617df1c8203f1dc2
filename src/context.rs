//! Repository context.
//!
//! Everything that identifies "where" a run happens: the GitHub user, repo
//! and branch hosting the files, the local working-tree root, and the Qiita
//! account that owns the articles. Resolved once per run and passed to the
//! sync engine.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::api::ArticleApi;
use crate::error::{Error, Result};
use crate::vcs::{Vcs, DETACHED_HEAD};

/// Hosts used to build and recognize URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    /// Qiita web host, e.g. `https://qiita.com`.
    pub article: String,
    /// Raw file host, e.g. `https://raw.githubusercontent.com`.
    pub content: String,
    /// Git server host name in the remote URL, e.g. `github.com`.
    pub git: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            article: "https://qiita.com".to_string(),
            content: "https://raw.githubusercontent.com".to_string(),
            git: "github.com".to_string(),
        }
    }
}

/// Identity of the current run.
#[derive(Debug, Clone)]
pub struct RepoContext {
    pub user: String,
    pub repo: String,
    pub branch: String,
    /// Ref name git reported (`HEAD` when detached).
    pub current_ref: String,
    pub topdir: PathBuf,
    /// Qiita account id of the token owner.
    pub account: String,
    pub hosts: Hosts,
}

impl RepoContext {
    #[must_use]
    pub fn new(
        user: &str,
        repo: &str,
        branch: &str,
        topdir: &Path,
        account: &str,
        hosts: Hosts,
    ) -> Self {
        Self {
            user: user.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            current_ref: branch.to_string(),
            topdir: topdir.to_path_buf(),
            account: account.to_string(),
            hosts,
        }
    }

    /// Query git and Qiita for the rest of the run's identity. `topdir` is
    /// the working-tree root already obtained from `vcs`.
    ///
    /// `fallback_ref` is consulted when HEAD is detached (e.g. `GITHUB_REF`
    /// in CI, `refs/heads/main`).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the remote URL is not recognized or no
    /// branch can be determined, or the underlying git/API error.
    pub async fn resolve<A: ArticleApi>(
        topdir: PathBuf,
        vcs: &dyn Vcs,
        api: &A,
        hosts: Hosts,
        fallback_ref: Option<&str>,
    ) -> Result<Self> {
        let remote_url = vcs.remote_url()?;
        let (user, repo) = parse_remote_url(&remote_url, &hosts.git)?;
        let current_ref = vcs.current_ref()?;
        let branch = resolve_branch(&current_ref, fallback_ref)?;

        let account = api.authenticated_user().await?;
        debug!(%user, %repo, %branch, %account, topdir = %topdir.display(), "Resolved repository context");

        Ok(Self {
            user,
            repo,
            branch,
            current_ref,
            topdir,
            account,
            hosts,
        })
    }

    /// `<content>/<user>/<repo>/<branch>/`
    #[must_use]
    pub fn content_prefix(&self) -> String {
        format!(
            "{}/{}/{}/{}/",
            self.hosts.content.trim_end_matches('/'),
            self.user,
            self.repo,
            self.branch
        )
    }

    /// `<article>/<account>/items/`
    #[must_use]
    pub fn article_prefix(&self) -> String {
        format!(
            "{}/{}/items/",
            self.hosts.article.trim_end_matches('/'),
            self.account
        )
    }

    /// Raw-file URL of a local path, or `None` if it lies outside the root.
    #[must_use]
    pub fn to_hosted_file_url(&self, path: &Path) -> Option<String> {
        let path = normalize_path(&self.topdir.join(path));
        let relative = path.strip_prefix(&self.topdir).ok()?;
        Some(format!("{}{}", self.content_prefix(), to_posix(relative)))
    }

    /// Qiita page URL of an article id.
    #[must_use]
    pub fn to_article_url(&self, id: &str) -> String {
        format!("{}{id}", self.article_prefix())
    }
}

/// Extract `(user, repo)` from an SSH or HTTPS remote URL on `git_host`.
///
/// # Errors
///
/// Returns `Error::Config` if the URL matches neither shape.
pub fn parse_remote_url(url: &str, git_host: &str) -> Result<(String, String)> {
    let host = regex::escape(git_host);
    let shapes = [
        format!(r"^(?:ssh://)?[^@/\s]+@{host}[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$"),
        format!(r"^https?://(?:[^@/\s]+@)?{host}/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$"),
    ];

    for shape in &shapes {
        let regex = Regex::new(shape).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(caps) = regex.captures(url.trim()) {
            return Ok((caps[1].to_string(), caps[2].to_string()));
        }
    }

    Err(Error::Config(format!(
        "remote URL {url:?} is not a {git_host} repository"
    )))
}

/// Branch name for links: the current branch, else the fallback ref with
/// its `refs/` prefix removed.
///
/// # Errors
///
/// Returns `Error::Config` when HEAD is detached and no fallback is set.
pub fn resolve_branch(current_ref: &str, fallback_ref: Option<&str>) -> Result<String> {
    if current_ref != DETACHED_HEAD {
        return Ok(current_ref.to_string());
    }
    fallback_ref
        .filter(|r| !r.trim().is_empty())
        .map(|r| r.strip_prefix("refs/").unwrap_or(r).to_string())
        .ok_or_else(|| Error::Config("cannot determine the branch of a detached HEAD".to_string()))
}

/// Resolve `.` and `..` lexically without touching the file system.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Path of `target` relative to the directory `base`, both absolute and
/// normalized.
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &target[common..] {
        out.push(component);
    }
    out
}

/// Join path components with `/`.
#[must_use]
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::vcs::testing::FakeVcs;
    use tempfile::TempDir;

    fn context() -> RepoContext {
        RepoContext::new("someone", "articles", "main", Path::new("/repo"), "qiitan", Hosts::default())
    }

    #[test]
    fn test_parse_remote_url_shapes() {
        let expected = ("someone".to_string(), "articles".to_string());
        for url in [
            "git@github.com:someone/articles.git",
            "git@github.com:someone/articles",
            "ssh://git@github.com/someone/articles.git",
            "https://github.com/someone/articles.git",
            "https://github.com/someone/articles",
            "https://token@github.com/someone/articles/",
        ] {
            assert_eq!(parse_remote_url(url, "github.com").unwrap(), expected, "{url}");
        }
    }

    #[test]
    fn test_parse_remote_url_rejects_other_hosts() {
        let err = parse_remote_url("https://gitlab.com/someone/articles.git", "github.com")
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("remote")));
        assert!(parse_remote_url("https://github.com.evil/a/b", "github.com").is_err());
    }

    #[test]
    fn test_resolve_branch() {
        assert_eq!(resolve_branch("main", Some("refs/heads/x")).unwrap(), "main");
        assert_eq!(resolve_branch("HEAD", Some("refs/pull/7/merge")).unwrap(), "pull/7/merge");
        assert_eq!(resolve_branch("HEAD", Some("heads/dev")).unwrap(), "heads/dev");
        let err = resolve_branch("HEAD", None).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("branch")));
    }

    #[test]
    fn test_hosted_file_url() {
        let ctx = context();
        assert_eq!(
            ctx.to_hosted_file_url(Path::new("/repo/img/a.png")).as_deref(),
            Some("https://raw.githubusercontent.com/someone/articles/main/img/a.png")
        );
        assert_eq!(
            ctx.to_hosted_file_url(Path::new("/repo/docs/../img/./a.png")).as_deref(),
            Some("https://raw.githubusercontent.com/someone/articles/main/img/a.png")
        );
        assert_eq!(
            ctx.to_hosted_file_url(Path::new("/repo")).as_deref(),
            Some("https://raw.githubusercontent.com/someone/articles/main/")
        );
        assert_eq!(ctx.to_hosted_file_url(Path::new("/repo/../etc/passwd")), None);
        assert_eq!(ctx.to_hosted_file_url(Path::new("/elsewhere/a.png")), None);
    }

    #[test]
    fn test_article_url() {
        assert_eq!(context().to_article_url("abc"), "https://qiita.com/qiitan/items/abc");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/repo/other.md"), Path::new("/repo/a/b")),
            PathBuf::from("../../other.md")
        );
        assert_eq!(
            relative_path(Path::new("/repo/a/b/c.md"), Path::new("/repo/a/b")),
            PathBuf::from("c.md")
        );
        assert_eq!(
            relative_path(Path::new("/repo/x/c.md"), Path::new("/repo/a")),
            PathBuf::from("../x/c.md")
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[tokio::test]
    async fn test_resolve_uses_fallback_ref_when_detached() {
        let dir = TempDir::new().unwrap();
        let mut vcs = FakeVcs::new(dir.path());
        vcs.current_ref = "HEAD".to_string();
        let api = FakeApi::new("qiitan");

        let ctx = RepoContext::resolve(
            vcs.topdir().unwrap(),
            &vcs,
            &api,
            Hosts::default(),
            Some("refs/heads/feature"),
        )
        .await
        .unwrap();

        assert_eq!(ctx.user, "someone");
        assert_eq!(ctx.repo, "articles");
        assert_eq!(ctx.branch, "heads/feature");
        assert_eq!(ctx.current_ref, "HEAD");
        assert_eq!(ctx.account, "qiitan");
        assert_eq!(ctx.topdir, dir.path());
        assert_eq!(api.calls(), vec!["user"]);
    }
}
