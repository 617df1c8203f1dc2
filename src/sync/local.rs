//! The set of local articles loaded for one run.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::model::{Article, TimestampSource};

/// Local articles in path order.
#[derive(Debug, Clone, Default)]
pub struct LocalArticles {
    articles: Vec<Article>,
}

impl LocalArticles {
    /// Load every file in `paths`.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub fn load(paths: Vec<PathBuf>, timestamps: &dyn TimestampSource) -> Result<Self> {
        let articles = paths
            .into_iter()
            .filter(|p| p.is_file())
            .map(|p| Article::load(&p, timestamps))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = articles.len(), "Loaded local articles");
        Ok(Self::from_articles(articles))
    }

    /// Wrap already parsed articles, sorting them by path.
    #[must_use]
    pub fn from_articles(mut articles: Vec<Article>) -> Self {
        articles.sort_by(|a, b| a.path.cmp(&b.path));
        Self { articles }
    }

    #[must_use]
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Articles stored at or below `target`.
    pub fn under<'a>(&'a self, target: &'a Path) -> impl Iterator<Item = &'a Article> + 'a {
        self.articles
            .iter()
            .filter(move |a| a.path.as_deref().is_some_and(|p| p.starts_with(target)))
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id() == Some(id))
    }

    #[must_use]
    pub fn by_path(&self, path: &Path) -> Option<&Article> {
        self.articles.iter().find(|a| a.path.as_deref() == Some(path))
    }

    /// Local file holding the article with `id`.
    #[must_use]
    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.by_id(id).and_then(|a| a.path.as_deref())
    }
}
