//! Error types for digest builds.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a digest build.
///
/// Every variant is fatal: a build either completes or returns one of
/// these, never a partial tree.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The filesystem did not report a modification time.
    #[error("Modification time unavailable for {path}: {source}")]
    MissingModifiedTime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Socket, FIFO, device or other entry that has no digestable content.
    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: PathBuf },

    /// A followed symlink leads back to one of its own ancestors.
    #[error("Symlink cycle detected at {path}")]
    SymlinkCycle { path: PathBuf },

    /// An ignore pattern could not be compiled.
    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A node finished building without a digest.
    #[error("Node was never digested: {path}")]
    Undigested { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {message}")]
    ThreadPool { message: String },
}

impl DigestError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::MissingModifiedTime { path, .. }
            | Self::UnsupportedFileType { path }
            | Self::SymlinkCycle { path }
            | Self::Undigested { path } => Some(path),
            Self::InvalidPattern { .. } | Self::InvalidConfig { .. } | Self::ThreadPool { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_error_io() {
        let err = DigestError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, DigestError::PermissionDenied { .. }));
        assert_eq!(err.path(), Some(std::path::Path::new("/test/path")));

        let err = DigestError::io("/gone", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, DigestError::NotFound { .. }));

        let err = DigestError::io("/x", std::io::Error::other("boom"));
        assert!(err.to_string().contains("/x"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_undigested_carries_path() {
        let err = DigestError::Undigested {
            path: "/data/root".into(),
        };
        assert_eq!(err.path(), Some(std::path::Path::new("/data/root")));
        assert!(err.to_string().contains("never digested"));
    }

    #[test]
    fn test_config_errors_have_no_path() {
        let err = DigestError::InvalidConfig {
            message: "bad".to_string(),
        };
        assert!(err.path().is_none());
    }
}
