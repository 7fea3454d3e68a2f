//! CLI support for json-transformer
//!
//! Provides programmatic access to the `json-transform` binary's behavior:
//! loading documents and statements, running them, and writing the results.

mod io;
mod run;

pub use io::{load_documents, load_transformers, parse_documents, save_results};
pub use run::{RunOptions, build_pipeline, execute_run};

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// A statement did not compile
    #[error("Compile error: {0}")]
    Compile(#[from] crate::CompileError),

    /// A single document failed to transform
    #[error("Transform error: {0}")]
    Transform(#[from] crate::TransformError),

    /// Invalid JSON input
    #[error("Invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Result serialization failed
    #[error("Cannot serialize result: {0}")]
    Serialize(#[source] serde_json::Error),

    /// IO error
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No input path and nothing piped on stdin
    #[error("No input provided. Pass a file or directory, or pipe JSON to stdin.")]
    NoInput,

    /// A single result was sent to a directory-style output path
    #[error("Cannot write a single result to directory path '{}'; use a path containing '.'", .0.display())]
    OutputShape(PathBuf),
}
