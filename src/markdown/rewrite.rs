//! Link and image target rewriting.
//!
//! Only the target token inside the parentheses is handed to the transform:
//! `[text](TARGET "title")`. The target ends at the first whitespace or the
//! closing `)`; anything after it up to `)` is kept verbatim.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::segment::segment;

/// `[text](target rest)`, with an optional leading `!` captured so images
/// can be skipped (the regex crate has no lookbehind).
static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)(\[[^\]]*\]\()([^\s)]+)([^)]*\))").expect("link regex is valid")
});

/// `![alt](target rest)`
static IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!\[[^\]]*\]\()([^\s)]+)([^)]*\))").expect("image regex is valid")
});

/// Apply `transform` to every link target in `text`. Images are left alone.
pub fn rewrite_links<F>(text: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    LINK_REGEX
        .replace_all(text, |caps: &Captures<'_>| {
            if caps[1].is_empty() {
                format!("{}{}{}", &caps[2], transform(&caps[3]), &caps[4])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Apply `transform` to every image target in `text`.
pub fn rewrite_images<F>(text: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    IMAGE_REGEX
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}{}{}", &caps[1], transform(&caps[2]), &caps[3])
        })
        .into_owned()
}

/// Apply `f` to every prose segment, copying code segments byte-for-byte.
pub fn map_prose<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    segment(text)
        .into_iter()
        .map(|seg| if seg.is_code() { seg.text.to_string() } else { f(seg.text) })
        .collect()
}

/// Rewrite link targets with `links` and image targets with `images`,
/// outside of code.
pub fn rewrite_prose_with<L, I>(text: &str, mut links: L, mut images: I) -> String
where
    L: FnMut(&str) -> String,
    I: FnMut(&str) -> String,
{
    map_prose(text, |prose| {
        let linked = rewrite_links(prose, &mut links);
        rewrite_images(&linked, &mut images)
    })
}

/// Rewrite both link and image targets with the same `transform`, outside
/// of code.
pub fn rewrite_prose<F>(text: &str, transform: F) -> String
where
    F: Fn(&str) -> String,
{
    rewrite_prose_with(text, &transform, &transform)
}
