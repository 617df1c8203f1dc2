//! Bidirectional sync between local Markdown files and Qiita.
//!
//! - **Translation**: local form (relative links) ⇄ global form (Qiita and
//!   raw GitHub URLs)
//! - **Classification**: each local/remote pairing lands in one `SyncState`
//! - **Dispatch**: `check`, `sync` and `purge` map states to actions
//! - **Transfer**: plain `download`, `upload` and `delete`
//!
//! # Example
//!
//! ```ignore
//! use qsync::sync::{ConflictPolicy, Engine, LocalArticles};
//!
//! let locals = LocalArticles::load(files, &FileMtime)?;
//! let engine = Engine::new(&client, &ctx, &locals, 100);
//! let report = engine.sync(&ctx.topdir, ConflictPolicy::Report).await?;
//! ```

mod diff;
mod dispatch;
mod engine;
mod local;
mod report;
mod state;
mod translate;

pub use diff::unified_diff;
pub use dispatch::{plan, Action, ConflictPolicy, Mode};
pub use engine::Engine;
pub use local::LocalArticles;
pub use report::{ReportEntry, SyncReport};
pub use state::{classify, SyncEntry, SyncState};
pub use translate::Translator;
