//! Data models for Qiita Sync.
//!
//! - `Tag` / `TagSet`
//! - `ArticleMetadata` / `Article`
//! - Qiita wire types

pub mod article;
pub mod remote;
pub mod tag;

pub use article::{
    canonical_body, Article, ArticleMetadata, FileMtime, TimestampSource, DEFAULT_TAGS,
    DEFAULT_TITLE, NATIVE_LINE_ENDING, REMOTE_LINE_ENDING,
};
pub use remote::{AuthenticatedUser, ItemPayload, RemoteItem};
pub use tag::{Tag, TagSet};
