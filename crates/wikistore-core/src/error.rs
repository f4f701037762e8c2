//! Error types for wikistore.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level result type for wikistore operations.
pub type Result<T> = std::result::Result<T, WikiError>;

/// Top-level error type for wikistore.
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("could not load page data for page {page}: {source}")]
    PageLoad {
        page: String,
        #[source]
        source: VersionsError,
    },

    #[error("could not commit page {page}: {source}")]
    PageCommit {
        page: String,
        #[source]
        source: VersionsError,
    },

    #[error("could not remove page {page}: {source}")]
    PageRemove {
        page: String,
        #[source]
        source: VersionsError,
    },

    #[error("version {version} not found for page {page}")]
    VersionNotFound { page: String, version: String },

    #[error("invalid page path: {0:?}")]
    InvalidPath(String),

    #[error("invalid page name: {0:?}")]
    InvalidPageName(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl WikiError {
    /// The I/O error kind behind a load, commit or remove failure, if any.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::PageLoad { source, .. }
            | Self::PageCommit { source, .. }
            | Self::PageRemove { source, .. } => source.io_kind(),
            Self::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Errors raised by a versions controller backend.
#[derive(Debug, Error)]
pub enum VersionsError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no revision {} of {}", version.as_deref().unwrap_or("HEAD"), path.display())]
    NotFound {
        path: PathBuf,
        version: Option<String>,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("bad version metadata in {}: {message}", path.display())]
    Metadata { path: PathBuf, message: String },
}

impl VersionsError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::NotFound { .. } => Some(io::ErrorKind::NotFound),
            Self::Encoding { .. } => Some(io::ErrorKind::InvalidData),
            Self::Metadata { .. } => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = WikiError::VersionNotFound {
            page: "FrontPage".to_string(),
            version: "20250210-deadbeef".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FrontPage"));
        assert!(msg.contains("20250210-deadbeef"));

        let err = VersionsError::NotFound {
            path: PathBuf::from("root/FrontPage.wiki"),
            version: None,
        };
        assert!(err.to_string().contains("HEAD"));
    }

    #[test]
    fn page_load_carries_io_kind() {
        let err = WikiError::PageLoad {
            page: "root/FrontPage".to_string(),
            source: VersionsError::io(
                "root/FrontPage.wiki",
                io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
            ),
        };
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
        assert!(err.to_string().contains("root/FrontPage"));
    }
}
