//! Conversion errors.
//!
//! Every kind is unrecoverable at the point of detection: the current
//! conversion aborts and nothing reaches serialization with partially
//! resolved data.

use derive_more::Display;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display)]
pub enum Error {
    /// A requested input path could not be opened.
    #[display(fmt = "cannot open {}: {}", "path.display()", source)]
    MissingInput {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An expected column is absent from a CSV header.
    #[display(fmt = "{}: no column matching '{}'", "file.display()", column)]
    MalformedSchema { file: PathBuf, column: String },
    /// No label name is a substring of the identifier.
    #[display(fmt = "no label matches identifier '{}'", identifier)]
    UnresolvedLabel { identifier: String },
    /// An edge endpoint is absent from every candidate partition.
    #[display(
        fmt = "{}: identifier '{}' not found in any candidate partition",
        "file.display()",
        identifier
    )]
    UnresolvedIdentifier { identifier: String, file: PathBuf },
    /// A query identifier violates the `<label>_<rank>` convention.
    #[display(fmt = "identifier '{}': {}", identifier, reason)]
    ConventionViolation { identifier: String, reason: String },
    /// A binary label or graph file fails structural validation.
    #[display(fmt = "corrupt input: {}", _0)]
    Corrupt(String),
    /// The query text does not parse.
    #[display(fmt = "query syntax error: {}", _0)]
    QuerySyntax(String),
    #[display(fmt = "{}", _0)]
    Io(std::io::Error),
    #[display(fmt = "{}", _0)]
    Csv(csv::Error),
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}
