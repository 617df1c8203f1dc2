//! Link translation between local and global form.
//!
//! In local form, links point at files relative to the article. In global
//! form they point at Qiita article pages or raw GitHub file URLs, so the
//! article renders correctly on Qiita.

use std::path::{Path, PathBuf};

use super::local::LocalArticles;
use crate::context::{normalize_path, relative_path, to_posix, RepoContext};
use crate::markdown::rewrite_prose_with;
use crate::model::{Article, ArticleMetadata, NATIVE_LINE_ENDING, REMOTE_LINE_ENDING};

/// Strip `prefix` from `text`, ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Split `target#fragment` into `("target", "#fragment")`.
fn split_fragment(link: &str) -> (&str, &str) {
    link.find('#').map_or((link, ""), |i| link.split_at(i))
}

/// A full URL: scheme plus host, or one of the host-less schemes links use.
fn is_url(link: &str) -> bool {
    url::Url::parse(link)
        .is_ok_and(|url| url.has_host() || matches!(url.scheme(), "mailto" | "tel" | "data"))
}

fn is_absolute(link: &str) -> bool {
    link.starts_with('/') || link.starts_with('\\') || Path::new(link).is_absolute()
}

/// Translates article bodies for one repository context.
pub struct Translator<'a> {
    ctx: &'a RepoContext,
    locals: &'a LocalArticles,
}

impl<'a> Translator<'a> {
    #[must_use]
    pub fn new(ctx: &'a RepoContext, locals: &'a LocalArticles) -> Self {
        Self { ctx, locals }
    }

    /// Directory relative links of `article` are resolved against.
    fn base_dir(&self, article: &Article) -> PathBuf {
        article
            .path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| self.ctx.topdir.clone(), Path::to_path_buf)
    }

    /// Rewrite Qiita and raw-file URLs to paths relative to the article.
    ///
    /// Articles without a local path keep their links.
    #[must_use]
    pub fn to_local(&self, article: &Article) -> Article {
        let body = match article.path.as_deref().and_then(Path::parent) {
            Some(dir) => rewrite_prose_with(
                &article.body,
                |link| self.local_link(link, dir),
                |link| self.local_image(link, dir),
            ),
            None => article.body.clone(),
        };
        article.clone().with_body(body).canonical(NATIVE_LINE_ENDING)
    }

    /// Rewrite relative paths to Qiita and raw-file URLs.
    #[must_use]
    pub fn to_global(&self, article: &Article) -> Article {
        let dir = self.base_dir(article);
        let body = rewrite_prose_with(
            &article.body,
            |link| self.global_link(link, &dir),
            |link| self.global_image(link, &dir),
        );
        article.clone().with_body(body).canonical(REMOTE_LINE_ENDING)
    }

    fn local_link(&self, link: &str, dir: &Path) -> String {
        let (target, fragment) = split_fragment(link);
        let Some(id) = strip_prefix_ignore_case(target, &self.ctx.article_prefix()) else {
            return self.local_image(link, dir);
        };
        if id.is_empty() || id.contains('/') {
            return link.to_string();
        }

        let local = self.locals.path_of(id).map_or_else(
            || format!("{id}.md"),
            |path| to_posix(&relative_path(path, dir)),
        );
        format!("{local}{fragment}")
    }

    fn local_image(&self, link: &str, dir: &Path) -> String {
        let (target, fragment) = split_fragment(link);
        match strip_prefix_ignore_case(target, &self.ctx.content_prefix()) {
            Some(rest) => {
                let path = normalize_path(&self.ctx.topdir.join(rest));
                format!("{}{fragment}", to_posix(&relative_path(&path, dir)))
            }
            None => self.normalized(link, dir).unwrap_or_else(|| link.to_string()),
        }
    }

    /// Shortest relative spelling of a relative target inside the root, so
    /// `./p.png` and `sub/../p.png` read the same as `p.png`.
    fn normalized(&self, link: &str, dir: &Path) -> Option<String> {
        let (path, fragment) = Self::resolve(link, dir)?;
        if !path.starts_with(&self.ctx.topdir) {
            return None;
        }
        let relative = to_posix(&relative_path(&path, dir));
        (!relative.is_empty()).then(|| format!("{relative}{fragment}"))
    }

    /// Resolve a relative link target, or `None` if it must pass through.
    fn resolve(link: &str, dir: &Path) -> Option<(PathBuf, String)> {
        let (target, fragment) = split_fragment(link);
        if target.is_empty() || is_absolute(target) || is_url(target) {
            return None;
        }
        Some((normalize_path(&dir.join(target)), fragment.to_string()))
    }

    fn global_link(&self, link: &str, dir: &Path) -> String {
        let Some((path, fragment)) = Self::resolve(link, dir) else {
            return link.to_string();
        };
        if path.is_file() {
            if let Some(id) = self.id_of(&path) {
                return format!("{}{fragment}", self.ctx.to_article_url(&id));
            }
        }
        self.hosted(&path, &fragment).unwrap_or_else(|| link.to_string())
    }

    fn global_image(&self, link: &str, dir: &Path) -> String {
        Self::resolve(link, dir)
            .and_then(|(path, fragment)| self.hosted(&path, &fragment))
            .unwrap_or_else(|| link.to_string())
    }

    fn hosted(&self, path: &Path, fragment: &str) -> Option<String> {
        self.ctx
            .to_hosted_file_url(path)
            .map(|url| format!("{url}{fragment}"))
    }

    /// Id of the article stored at `path`: loaded articles first, else the
    /// file's header.
    fn id_of(&self, path: &Path) -> Option<String> {
        if let Some(article) = self.locals.by_path(path) {
            return article.metadata.id.clone();
        }
        ArticleMetadata::read(path).ok().and_then(|meta| meta.id)
    }
}
