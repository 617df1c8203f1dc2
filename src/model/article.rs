//! Articles and their on-disk representation.
//!
//! A local article file starts with an HTML comment holding `key: value`
//! lines, followed directly by the Markdown body:
//!
//! ```text
//! <!--
//! title:   Rust error handling
//! tags:    Rust=1.85,CLI
//! id:      4c1b0b7d4e2f0c9a1b2c
//! private: false
//! -->
//! # Rust error handling
//! ```
//!
//! Articles are values: every transform returns a new `Article`.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::remote::{ItemPayload, RemoteItem};
use super::tag::TagSet;
use crate::error::Result;

/// Title used when neither the header nor the body provides one.
pub const DEFAULT_TITLE: &str = "No Title";

/// Tag list used when the header has no `tags` line.
pub const DEFAULT_TAGS: &str = "No Tag";

/// Platform line terminator used for files written to disk.
pub const NATIVE_LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Line terminator used for bodies sent to Qiita.
pub const REMOTE_LINE_ENDING: &str = "\n";

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*<!--\s(.*?)\s-->(.*)\z").expect("header regex is valid")
});

static HEADER_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\w+\s*:").expect("header line regex is valid"));

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s+(.*)$").expect("heading regex is valid"));

static FIRST_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)").expect("token regex is valid"));

/// Interpret a header value as a boolean.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "y" | "yes" | "t" | "true" | "on" | "1"
    )
}

/// Strip leading and trailing blank lines and rejoin with `line_ending`.
///
/// Internal blank lines and whitespace are preserved. Idempotent.
#[must_use]
pub fn canonical_body(body: &str, line_ending: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join(line_ending),
        _ => String::new(),
    }
}

/// Best-effort title for an article without a `title` header line.
///
/// First Markdown heading, else the first non-blank token, else
/// [`DEFAULT_TITLE`].
#[must_use]
pub fn guess_title(body: &str) -> String {
    body.lines()
        .find_map(|line| HEADING_REGEX.captures(line).map(|c| c[1].trim().to_string()))
        .or_else(|| {
            body.lines()
                .find_map(|line| FIRST_TOKEN_REGEX.captures(line).map(|c| c[1].to_string()))
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

// ── Metadata ──────────────────────────────────────────────────

/// Header fields of an article.
///
/// Equality considers only `title` and `tags`: `id` and `private` never make
/// two articles differ in content.
#[derive(Debug, Clone)]
pub struct ArticleMetadata {
    pub title: String,
    pub tags: TagSet,
    /// Assigned by Qiita on first upload.
    pub id: Option<String>,
    pub private: bool,
}

impl PartialEq for ArticleMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.tags == other.tags
    }
}

impl ArticleMetadata {
    /// Parse header `key: value` lines. Unknown keys are ignored; a missing
    /// `title` or `tags` takes the given default. Values are trimmed, and an
    /// empty value is kept as empty.
    #[must_use]
    pub fn parse(text: &str, default_title: &str, default_tags: &str) -> Self {
        let mut title = default_title.to_string();
        let mut tags = default_tags.to_string();
        let mut id = None;
        let mut private = false;

        for line in text.lines().filter(|l| HEADER_LINE_REGEX.is_match(l)) {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "title" => title = value.to_string(),
                "tags" => tags = value.to_string(),
                "id" => id = Some(value.to_string()).filter(|v| !v.is_empty()),
                "private" => private = parse_bool(value),
                _ => {}
            }
        }

        Self {
            title,
            tags: TagSet::parse(&tags),
            id,
            private,
        }
    }

    /// Render header lines in canonical order with aligned values.
    #[must_use]
    pub fn render(&self, line_ending: &str) -> String {
        let mut lines = vec![
            format!("title:   {}", self.title),
            format!("tags:    {}", self.tags),
        ];
        if let Some(id) = &self.id {
            lines.push(format!("id:      {id}"));
        }
        lines.push(format!("private: {}", self.private));
        lines.join(line_ending)
    }

    /// Read only the metadata of an article file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(split_header(&text).0)
    }
}

impl fmt::Display for ArticleMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(NATIVE_LINE_ENDING))
    }
}

/// Split file text into metadata and body.
fn split_header(text: &str) -> (ArticleMetadata, &str) {
    match HEADER_REGEX.captures(text) {
        Some(caps) => {
            let header = caps.get(1).map_or("", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str());
            let body = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
            let metadata = ArticleMetadata::parse(header, &guess_title(body), DEFAULT_TAGS);
            (metadata, body)
        }
        None => (
            ArticleMetadata::parse("", &guess_title(text), DEFAULT_TAGS),
            text,
        ),
    }
}

// ── Timestamps ────────────────────────────────────────────────

/// Source of the comparison timestamp for local files.
pub trait TimestampSource {
    /// Last-change instant of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be determined.
    fn timestamp(&self, path: &Path) -> Result<DateTime<Utc>>;
}

/// Uses the file system modification time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMtime;

impl TimestampSource for FileMtime {
    fn timestamp(&self, path: &Path) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

// ── Article ───────────────────────────────────────────────────

/// The unit of sync.
#[derive(Debug, Clone)]
pub struct Article {
    pub metadata: ArticleMetadata,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    /// Set for articles backed by a local file.
    pub path: Option<PathBuf>,
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && canonical_body(&self.body, REMOTE_LINE_ENDING)
                == canonical_body(&other.body, REMOTE_LINE_ENDING)
    }
}

impl Article {
    /// Parse local file text.
    #[must_use]
    pub fn parse(text: &str, timestamp: DateTime<Utc>, path: Option<PathBuf>) -> Self {
        let (metadata, body) = split_header(text);
        Self {
            metadata,
            body: body.to_string(),
            timestamp,
            path,
        }
    }

    /// Load a local article file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its timestamp resolved.
    pub fn load(path: &Path, timestamps: &dyn TimestampSource) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let timestamp = timestamps.timestamp(path)?;
        Ok(Self::parse(&text, timestamp, Some(path.to_path_buf())))
    }

    /// Decode a Qiita item. Remote articles have no local path.
    #[must_use]
    pub fn from_remote(item: &RemoteItem) -> Self {
        Self {
            metadata: ArticleMetadata {
                title: item.title.trim().to_string(),
                tags: item.tags.clone(),
                id: Some(item.id.clone()),
                private: item.private,
            },
            body: item.body.clone(),
            timestamp: item.updated_at.with_timezone(&Utc),
            path: None,
        }
    }

    /// Render the on-disk text: header block, then the body unmodified.
    #[must_use]
    pub fn to_text(&self) -> String {
        let eol = NATIVE_LINE_ENDING;
        format!("<!--{eol}{}{eol}-->{eol}{}", self.metadata.render(eol), self.body)
    }

    /// Request body for create/update. The id travels in the URL.
    #[must_use]
    pub fn to_payload(&self) -> ItemPayload {
        ItemPayload {
            body: self.body.clone(),
            tags: self.metadata.tags.clone(),
            title: self.metadata.title.clone(),
            private: self.metadata.private,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.metadata.id.as_deref()
    }

    #[must_use]
    pub fn with_body(self, body: String) -> Self {
        Self { body, ..self }
    }

    #[must_use]
    pub fn with_path(self, path: Option<PathBuf>) -> Self {
        Self { path, ..self }
    }

    #[must_use]
    pub fn with_metadata(self, metadata: ArticleMetadata) -> Self {
        Self { metadata, ..self }
    }

    #[must_use]
    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, ..self }
    }

    /// Body with leading/trailing blank lines removed.
    #[must_use]
    pub fn canonical(self, line_ending: &str) -> Self {
        let body = canonical_body(&self.body, line_ending);
        self.with_body(body)
    }

    /// Short label for status lines: the file name, else the id.
    #[must_use]
    pub fn label(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| self.metadata.id.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    const WITH_HEADER: &str = "\n<!--\ntitle: test\ntags:  test\nid:    1234567890ABCDEFG\n-->\n\n# test\n";

    #[test]
    fn test_parse_header() {
        let article = Article::parse(WITH_HEADER, now(), None);
        assert_eq!(article.metadata.title, "test");
        assert_eq!(article.metadata.tags.to_string(), "test");
        assert_eq!(article.id(), Some("1234567890ABCDEFG"));
        assert!(!article.metadata.private);
        assert_eq!(article.body, "\n# test\n");
    }

    #[test]
    fn test_parse_without_header_uses_heading() {
        let article = Article::parse("\n# section\n\ntext\n", now(), None);
        assert_eq!(article.metadata.title, "section");
        assert_eq!(article.metadata.tags.to_string(), DEFAULT_TAGS);
        assert_eq!(article.id(), None);
        assert_eq!(article.body, "\n# section\n\ntext\n");
    }

    #[test]
    fn test_guess_title_fallbacks() {
        assert_eq!(guess_title("  hello world\n## later"), "later");
        assert_eq!(guess_title("\n  hello world\n"), "hello");
        assert_eq!(guess_title("\n \n"), DEFAULT_TITLE);
    }

    #[test]
    fn test_private_flag_words() {
        for word in ["y", "Yes", "t", "TRUE", "on", "1"] {
            assert!(parse_bool(word), "{word}");
        }
        for word in ["", "no", "false", "0", "off", "maybe"] {
            assert!(!parse_bool(word), "{word}");
        }
        let article = Article::parse("<!--\nprivate: true\n-->\nbody", now(), None);
        assert!(article.metadata.private);
        assert_eq!(article.metadata.title, "body");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let meta = ArticleMetadata::parse("title: a\nauthor: me\nnot a pair", "d", "t");
        assert_eq!(meta.title, "a");
        assert_eq!(meta.tags.to_string(), "t");
    }

    #[test]
    fn test_render_order_and_alignment() {
        let meta = ArticleMetadata::parse("private: yes\nid: X1\ntags: b,a\ntitle: T", "d", "t");
        assert_eq!(
            meta.render("\n"),
            "title:   T\ntags:    a,b\nid:      X1\nprivate: true"
        );

        let unsynced = ArticleMetadata::parse("title: T", "d", "t");
        assert_eq!(unsynced.render("\n"), "title:   T\ntags:    t\nprivate: false");
    }

    #[test]
    fn test_metadata_equality_ignores_id_and_private() {
        let a = ArticleMetadata::parse("title: T\ntags: x\nid: 1\nprivate: true", "d", "t");
        let b = ArticleMetadata::parse("title: T\ntags: X", "d", "t");
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_body() {
        assert_eq!(canonical_body("\n\n  \na\n\n b \n\n", "\n"), "a\n\n b ");
        assert_eq!(canonical_body("a\r\nb\r\n", "\n"), "a\nb");
        assert_eq!(canonical_body("a\nb", "\r\n"), "a\r\nb");
        assert_eq!(canonical_body("\n \n", "\n"), "");
    }

    #[test]
    fn test_canonical_body_is_idempotent() {
        let inputs = ["", "\n\nx\n\n", "a\r\n\r\nb", "  lead\n\ttab\n  "];
        for input in inputs {
            for eol in ["\n", "\r\n"] {
                let once = canonical_body(input, eol);
                assert_eq!(canonical_body(&once, eol), once);
            }
        }
    }

    #[test]
    fn test_article_equality() {
        let a = Article::parse("<!--\ntitle: T\ntags: x\n-->\n\nbody\n\n", now(), None);
        let b = Article::parse("<!--\ntitle: T\ntags: x\nid: 9\n-->\r\nbody\r\n", now(), None);
        let c = Article::parse("<!--\ntitle: T\ntags: x\n-->\nother\n", now(), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("article.md");

        let original = Article::parse(
            "<!--\ntitle: Round trip\ntags: Rust=1.85,CLI\nid: abc\nprivate: on\n-->\n# Round trip\n\nText [x](y.md)\n",
            now(),
            Some(path.clone()),
        );
        fs::write(&path, original.to_text()).unwrap();

        let reread = Article::load(&path, &FileMtime).unwrap();
        assert_eq!(reread, original);
        assert_eq!(reread.body, original.body);
        assert_eq!(reread.id(), Some("abc"));
        assert!(reread.metadata.private);
        assert_eq!(reread.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_remote_titles_survive_a_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("article.md");

        for title in ["", "  padded  "] {
            let item: RemoteItem = serde_json::from_value(serde_json::json!({
                "id": "abc",
                "title": title,
                "tags": [],
                "body": "# Heading\n\ntext\n",
                "private": false,
                "updated_at": "2024-01-10T21:00:00+09:00",
                "created_at": "2024-01-01T09:00:00+09:00"
            }))
            .unwrap();
            let remote = Article::from_remote(&item);
            assert_eq!(remote.metadata.title, title.trim());

            fs::write(&path, remote.clone().with_path(Some(path.clone())).to_text()).unwrap();
            let reread = Article::load(&path, &FileMtime).unwrap();

            assert_eq!(reread.metadata.title, title.trim(), "{title:?}");
            assert_eq!(reread, remote, "{title:?}");
        }
    }

    #[test]
    fn test_empty_header_values() {
        let meta = ArticleMetadata::parse("title:\ntags:\nid:", "d", "t");
        assert_eq!(meta.title, "");
        assert!(meta.tags.is_empty());
        assert_eq!(meta.id, None);
    }

    #[test]
    fn test_payload_has_no_id() {
        let article = Article::parse("<!--\ntitle: T\ntags: a\nid: 42\n-->\nbody", now(), None);
        let json = serde_json::to_value(article.to_payload()).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["title"], "T");
        assert_eq!(json["tags"][0]["name"], "a");
        assert_eq!(json["private"], false);
    }

    #[test]
    fn test_with_helpers_do_not_touch_other_fields() {
        let article = Article::parse(WITH_HEADER, now(), None);
        let moved = article.clone().with_path(Some(PathBuf::from("/x.md")));
        assert_eq!(moved.metadata.id, article.metadata.id);
        assert_eq!(moved.label(), "x.md");
        assert_eq!(article.label(), "1234567890ABCDEFG");
    }
}
