//! Error type of the dump, cache and configuration layers.
//!
//! The analysis core never fails; errors only come from reading what the
//! host adapter wrote to disk.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmplintError {
    /// A dump, cache or config file could not be read or written
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dump file is not a valid `CallSiteDump`
    #[error("Parse error in {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        /// 1-based, when serde_json knows it
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl TmplintError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn parse_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// File the error is about, if it concerns one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Config { path, .. } => {
                Some(path)
            }
            Self::Cache { .. } | Self::InvalidArgument { .. } => None,
        }
    }
}

pub type TmplintResult<T> = Result<T, TmplintError>;

/// Attach the offending path to `std::io` results.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> TmplintResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> TmplintResult<T> {
        self.map_err(|e| TmplintError::io(path, e))
    }
}
