//! Local article discovery.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use crate::context::to_posix;
use crate::error::Result;

/// Default include patterns, relative to the repository root.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.md"];

/// Default exclude patterns, relative to the repository root.
pub const DEFAULT_EXCLUDE: &[&str] = &["**/README.md", ".*/**/*.md"];

/// Compiled include/exclude patterns.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    /// Compile the pattern lists. `*` does not cross `/`; `**` does.
    ///
    /// # Errors
    ///
    /// Returns `Error::Glob` for an invalid pattern.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// Whether a root-relative path is selected.
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        let posix = to_posix(relative);
        self.include.is_match(&posix) && !self.exclude.is_match(&posix)
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob: Glob = GlobBuilder::new(pattern.as_ref())
            .literal_separator(true)
            .build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// All files under `root` selected by `filter`, as sorted absolute paths.
///
/// # Errors
///
/// Returns an error if the directory walk fails.
pub fn discover(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_git_dir(e)) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if filter.matches(relative) {
            trace!(path = %entry.path().display(), "Discovered article");
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_filter() -> FileFilter {
        FileFilter::new(DEFAULT_INCLUDE, DEFAULT_EXCLUDE).unwrap()
    }

    #[test]
    fn test_default_patterns() {
        let filter = default_filter();
        assert!(filter.matches(Path::new("a.md")));
        assert!(filter.matches(Path::new("docs/deep/b.md")));
        assert!(!filter.matches(Path::new("README.md")));
        assert!(!filter.matches(Path::new("docs/README.md")));
        assert!(!filter.matches(Path::new(".github/workflows/x.md")));
        assert!(!filter.matches(Path::new("notes.txt")));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let filter = FileFilter::new(&["*.md"], &[] as &[&str]).unwrap();
        assert!(filter.matches(Path::new("top.md")));
        assert!(!filter.matches(Path::new("sub/nested.md")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileFilter::new(&["a[.md"], &[] as &[&str]).is_err());
    }

    #[test]
    fn test_discover_walks_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/c")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        for file in ["z.md", "b/a.md", "b/c/d.md", "README.md", ".git/x.md", ".hidden/y.md", "b/img.png"] {
            fs::write(root.join(file), "x").unwrap();
        }

        let files = discover(root, &default_filter()).unwrap();

        assert_eq!(
            files,
            vec![root.join("b/a.md"), root.join("b/c/d.md"), root.join("z.md")]
        );
    }
}
