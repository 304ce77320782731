use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Application-level error surfaced to `main`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl AppError {
    /// Process exit code for this error
    ///
    /// - Configuration problems: 2
    /// - Failed test notification: 1
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Notify(_) => 1,
        }
    }
}

/// Transient I/O failure while opening or tailing the log file.
///
/// Never fatal: the monitor loop logs it, pauses one poll interval and starts over.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("permission denied: {}: {source}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MonitorError {
    /// Classify an `io::Error` raised while working on `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => MonitorError::NotFound { path },
            io::ErrorKind::PermissionDenied => MonitorError::PermissionDenied { path, source },
            _ => MonitorError::Io { path, source },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            MonitorError::NotFound { path }
            | MonitorError::PermissionDenied { path, .. }
            | MonitorError::Io { path, .. } => path,
        }
    }
}

/// Alert delivery failure
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to send webhook: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned error: {status} - {body}")]
    Status { status: u16, body: String },
}
