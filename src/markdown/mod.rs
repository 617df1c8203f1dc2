//! Markdown handling limited to what sync needs.
//!
//! - [`segment`] splits a document into code and prose spans
//! - [`rewrite`] rewrites link and image targets inside prose only
//!
//! All other Markdown content passes through untouched.

mod rewrite;
mod segment;

pub use rewrite::{map_prose, rewrite_images, rewrite_links, rewrite_prose, rewrite_prose_with};
pub use segment::{segment, Segment, SegmentKind};
