//! Error types shared by the generator, loader, benchmark and controller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The number file could not be created, written, renamed or read.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the number file is not a base-10 integer.
    #[error("line {line}: {text:?} is not a valid integer")]
    Parse { line: usize, text: String },

    /// The search text typed by the user is not a base-10 integer.
    #[error("enter a valid integer (got {input:?})")]
    InvalidInput { input: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// A worker thread failed in an unexpected way (panic or closed channel).
    #[error("{0}")]
    Worker(String),
}

impl SearchError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SearchError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// True for the missing-file case, which the UI reports as "generate first".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SearchError::FileAccess { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}
