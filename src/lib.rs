//! Library crate for userdir.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST client for the user API (`api`)
//! - Keyed query cache with request de-duplication (`query`)
//! - Application state and update loop (`app`)
//! - Command-line configuration (`config`) and log setup (`logging`)
//! - Domain records (`model`) and error types (`error`)
//! - Search and sort helpers for the list (`search`)
//! - Opening links with the platform handler (`sys`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdir` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod search;
pub mod sys;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{FetchError, Result};
