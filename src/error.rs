// src/error.rs
use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures that abort an extraction run. Row-level problems never show up
/// here: absent fields are read as empty strings and filtered out.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input path is missing or cannot be opened for reading.
    #[error("cannot open input {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input cannot be parsed as delimited text with a header row.
    #[error("malformed CSV in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

