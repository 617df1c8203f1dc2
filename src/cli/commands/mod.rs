//! Command implementations.

pub mod articles;
pub mod completions;
pub mod version;
