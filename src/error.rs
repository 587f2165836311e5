//! Error handling for stencil.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can abort a generation run.
///
/// A destination that already holds a marker file is not an error: it is
/// reported as [`crate::engine::Generation::Skipped`].
#[derive(Error, Debug)]
pub enum Error {
    /// A required collaborator is missing or invalid (unknown template or preset,
    /// empty rule set, empty match pattern, malformed manifest).
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Any read, mkdir or write failure, carrying the offending path.
    #[error("IO error at '{}': {source}.", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination root cannot be computed uniquely.
    #[error("Resolution error: {0}.")]
    ResolutionError(String),

    /// The template tree cannot be replicated as-is.
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// An exclude pattern is not a valid glob.
    #[error("Pattern error: {0}.")]
    PatternError(#[from] globset::Error),
}

impl Error {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::IoError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        if let Some(ancestor) = err.loop_ancestor() {
            return Error::TemplateError(format!(
                "filesystem loop between '{}' and '{}'",
                path.display(),
                ancestor.display()
            ));
        }
        match err.into_io_error() {
            Some(source) => Error::IoError { path, source },
            None => Error::TemplateError(format!("cannot walk '{}'", path.display())),
        }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
