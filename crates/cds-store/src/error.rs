use std::io;
use std::path::PathBuf;

use crate::layout::ContentId;

/// error type for content store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid content id '{0}'")]
    InvalidId(String),

    #[error("invalid member path '{0}'")]
    InvalidPath(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("content directory {0} does not exist or is not a directory")]
    RootUnavailable(PathBuf),

    #[error("upload of content package {id} was interrupted: {source}")]
    Receive {
        id: ContentId,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract content: {source}")]
    Unpack {
        id: ContentId,
        #[source]
        source: cds_archive::Error,
    },

    #[error("failed to delete content package {id}: {source}")]
    Deletion {
        id: ContentId,
        #[source]
        source: cds_fs::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] cds_fs::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn package_not_found(id: &ContentId) -> Self {
        Self::NotFound(format!("content package {id}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
