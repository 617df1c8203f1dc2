//! Qiita Sync - bidirectional sync between a git repository of Markdown
//! articles and Qiita.
//!
//! This crate provides the core functionality for the `qsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Articles, tags and the Qiita item wire types
//! - [`markdown`] - Code-aware link and image rewriting
//! - [`sync`] - Translation, classification and dispatch
//! - [`api`] - Qiita REST client
//! - [`vcs`] - git queries
//! - [`context`] - Repository identity and URL building
//! - [`discover`] - Local article discovery
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod discover;
pub mod error;
pub mod markdown;
pub mod model;
pub mod sync;
pub mod vcs;

pub use error::{Error, Result};
