// vim: tw=80
use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can stop a generator from producing its output.
#[derive(Debug, Error)]
pub enum Error {
    /// A compilation unit or output file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: io::Error
    },
    /// The compilation unit is not syntactically valid Rust.
    #[error("{}:{line}:{column}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String
    },
    /// The compilation unit declares no trait.
    #[error("{}: no trait declaration found", .path.display())]
    NotFound {
        path: PathBuf
    },
    /// An assertion spec line is malformed.
    #[error("invalid assertion spec {spec:?}: {reason}")]
    Format {
        spec: String,
        reason: String
    },
    /// Something extracted from the source cannot be expressed in generated
    /// code.
    #[error("cannot generate {item}: {reason}")]
    Generation {
        item: String,
        reason: String
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io{path: path.into(), source}
    }

    pub(crate) fn format(spec: &str, reason: impl Into<String>) -> Self {
        Error::Format{spec: spec.to_owned(), reason: reason.into()}
    }

    pub(crate) fn generation(item: impl ToString, reason: impl Into<String>)
        -> Self
    {
        Error::Generation{item: item.to_string(), reason: reason.into()}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
