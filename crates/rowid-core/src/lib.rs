//! Add or overwrite a sequential identifier column in a delimited text table.
//!
//! ```no_run
//! use rowid_core::{annotate::annotate_paths, table::Placement};
//!
//! let summary = annotate_paths("scores.csv", "scores_with_id.csv")?;
//! assert_eq!(summary.placement, Placement::Inserted);
//! # Ok::<(), rowid_core::error::AnnotateError>(())
//! ```
#![deny(unused_must_use)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

#[macro_use]
pub mod clitypes;

pub mod annotate;
pub mod config;
pub mod error;
pub mod table;
pub mod util;

pub use crate::{
    annotate::{Summary, annotate_file, annotate_paths},
    clitypes::{CliError, CliResult, RowIdExitCode},
    config::{Config, Delimiter},
    error::AnnotateError,
    table::{IdColumn, Placement, Table},
};
