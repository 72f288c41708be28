#![forbid(unsafe_code)]
//! Generate platform string resources and analytics constants from spreadsheets.
//!
//! Translations and analytics event names live in a shared spreadsheet; weave
//! downloads its CSV exports and writes compile-ready files for Android
//! (`strings.xml`, Kotlin), iOS (`.strings`, Swift) and Web (JSON).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weave::{Config, HttpFetcher, run};
//!
//! // Reads weave-config.json from the working directory (or its parent)
//! let config = Config::discover()?;
//! run(&config, &HttpFetcher::new())?;
//! # Ok::<(), weave::Error>(())
//! ```
//!
//! # Pipeline
//!
//! 1. **Ingest**: every source is fetched and its header resolved; rows become
//!    [`Record`]s in a fresh [`Model`].
//! 2. **Validate**: keys must match `[A-Za-z0-9_]+`; a later duplicate replaces
//!    an earlier one.
//! 3. **Write**: a platform dialect renders the model, one file per language
//!    (strings) or a single file (analytics).
//!
//! # Spreadsheet layout
//!
//! - A `key` column is required; an optional `platforms` column restricts a row
//!   to a comma-separated list of platforms.
//! - Strings sheets have one column per configured language id.
//! - Analytics sheets have the configured type and tag columns.
//! - A key starting with `###` starts a section and is written as a comment.

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod ingest;
pub mod pipeline;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export most used types for easy consumption
pub use crate::{
    config::{AnalyticsConfig, Config, Language, Source, StringsConfig},
    error::Error,
    fetch::HttpFetcher,
    pipeline::{RunSummary, run, run_analytics, run_strings},
    types::{Model, Origin, Platform, Record, RecordValue},
};
