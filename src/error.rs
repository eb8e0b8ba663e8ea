use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Access denied reading config: {path}")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Config read task failed")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ConfigError {
    /// Map an io error from reading `path` onto the error taxonomy
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound { path },
            ErrorKind::InvalidInput | ErrorKind::IsADirectory => ConfigError::InvalidPath { path },
            // EACCES, EPERM and anything unexpected
            _ => ConfigError::AccessDenied { path, source },
        }
    }

    /// Stable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConfigError::AccessDenied { .. } | ConfigError::TaskJoin(_) => "ACCESS_DENIED",
            ConfigError::Parse { .. } => "PARSE_ERROR",
            ConfigError::InvalidPath { .. } => "INVALID_PATH",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failures of the command line front end
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to initialize thread pool")]
    ThreadPoolInit(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to serialize output")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output")]
    Write(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_mapping() {
        let path = PathBuf::from("/home/u/.claude.json");

        let err = ConfigError::from_io(path.clone(), Error::from(ErrorKind::NotFound));
        assert_eq!(err.code(), "FILE_NOT_FOUND");
        assert!(err.is_not_found());

        let err = ConfigError::from_io(path.clone(), Error::from(ErrorKind::PermissionDenied));
        assert_eq!(err.code(), "ACCESS_DENIED");

        let err = ConfigError::from_io(path.clone(), Error::from(ErrorKind::InvalidInput));
        assert_eq!(err.code(), "INVALID_PATH");

        // Unknown kinds fall back to access denied
        let err = ConfigError::from_io(path, Error::other("boom"));
        assert_eq!(err.code(), "ACCESS_DENIED");
        assert!(!err.is_not_found());
    }
}
