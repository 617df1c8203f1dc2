//! Article tags.
//!
//! Tags are written in the metadata block as a comma-separated list where
//! each entry is `name` or `name=v1|v2`, e.g. `tags: Rust=1.85,CLI`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single tag with optional versions.
///
/// Names compare case-insensitively; versions compare exactly and are kept
/// sorted.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

impl Tag {
    /// Create a tag, sorting its versions.
    pub fn new(name: impl Into<String>, versions: impl IntoIterator<Item = String>) -> Self {
        let mut versions: Vec<String> = versions.into_iter().collect();
        versions.sort();
        Self { name: name.into(), versions }
    }

    /// Parse `name` or `name=v1|v2`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((name, versions)) => Self::new(
                name.trim(),
                versions
                    .split('|')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from),
            ),
            None => Self::new(text.trim(), Vec::new()),
        }
    }

    fn sort_key(&self) -> (String, &str, &[String]) {
        (self.name.to_lowercase(), self.name.as_str(), self.versions.as_slice())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase() && self.versions == other.versions
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.versions.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.versions.join("|"))
        }
    }
}

/// Canonically sorted sequence of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Build a sorted tag set.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut tags: Vec<Tag> = tags.into_iter().collect();
        tags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self(tags)
    }

    /// Parse a comma-separated tag list. Empty entries are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.split(',')
                .filter(|entry| !entry.trim().is_empty())
                .map(Tag::parse),
        )
    }

    /// Tags in canonical order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", joined.join(","))
    }
}

impl Serialize for TagSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tags = Vec::<Tag>::deserialize(deserializer)?;
        Ok(Self::new(tags.into_iter().map(|t| Tag::new(t.name, t.versions))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parse_and_display() {
        let tag = Tag::parse("Python=3.9|3.10|2.7");
        assert_eq!(tag.name, "Python");
        assert_eq!(tag.versions, vec!["2.7", "3.10", "3.9"]);
        assert_eq!(tag.to_string(), "Python=2.7|3.10|3.9");
        assert_eq!(Tag::parse("Rust").to_string(), "Rust");
    }

    #[test]
    fn test_tag_equality_ignores_name_case() {
        assert_eq!(Tag::parse("rust"), Tag::parse("Rust"));
        assert_ne!(Tag::parse("rust=1"), Tag::parse("Rust=2"));
        assert_ne!(Tag::parse("rust=1"), Tag::parse("rust"));
    }

    #[test]
    fn test_tagset_is_sorted() {
        let tags = TagSet::parse("zsh, Bash,awk");
        assert_eq!(tags.to_string(), "awk,Bash,zsh");
    }

    #[test]
    fn test_tagset_equality_is_case_insensitive() {
        assert_eq!(TagSet::parse("Python,abc"), TagSet::parse("abc,python"));
    }

    #[test]
    fn test_tagset_skips_empty_entries() {
        assert_eq!(TagSet::parse("a,,b,").tags().len(), 2);
        assert!(TagSet::parse("").is_empty());
    }

    #[test]
    fn test_tagset_json_roundtrip_through_api_shape() {
        let json = serde_json::json!([
            {"name": "Rust", "versions": ["1.85", "1.0"]},
            {"name": "CLI", "versions": []}
        ]);
        let tags: TagSet = serde_json::from_value(json).unwrap();
        assert_eq!(tags.to_string(), "CLI,Rust=1.0|1.85");

        let back = serde_json::to_value(&tags).unwrap();
        assert_eq!(back[1]["versions"][0], "1.0");
    }
}
