//! CLI support for refjson
//!
//! Provides programmatic access to the `refjson` commands so other tools can
//! embed them.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, execute_features};
pub use convert::{OutputFormat, render};
pub use docs::{DocCategory, editions_table, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Document(#[from] crate::Error),

    /// Every error collected in tolerant mode
    #[error("{}", render_all(.0))]
    Documents(Vec<crate::Error>),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass a FILE, use --input, or pipe a document to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'refjson docs' to see available categories.")]
    UnknownCategory(String),
}

fn render_all(errors: &[crate::Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
