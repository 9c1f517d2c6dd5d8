//! Error types for linelog
//!
//! Every failure in the system is one of these variants. Failures inside
//! queued operations are delivered to the operation's completion callback;
//! the synchronous read returns them directly.
//!
//! ## Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | FileCreate | Log file or storage directory could not be created |
//! | Read | Log file could not be read |
//! | Write | Log file could not be written or synced |
//! | Delete | Log file could not be removed |
//! | InvalidCategory | Category cannot name a flat file |
//! | InvalidEntry | Entry is empty or contains a line separator |
//! | Shutdown | The worker owning the log has stopped |
//! | Saturated | Re-entrant submission found the queue full |
//! | WouldDeadlock | Blocking call made from the worker it waits on |
//! | Config | Invalid configuration value |
//! | Internal | Caught panic or invariant violation |

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All linelog errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Creating the log file (or its directory) failed
    #[error("failed to create {}: {source}", path.display())]
    FileCreate {
        /// Path that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Reading the log file failed
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing, truncating or syncing the log file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Removing the log file failed
    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        /// Path that could not be removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Category name cannot be used as a file name
    #[error("invalid category {name:?}: {reason}")]
    InvalidCategory {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Entry cannot be stored as a single line
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// The worker owning this log has been shut down
    #[error("log worker is shut down")]
    Shutdown,

    /// The worker's queue was full for a submission made from the worker itself
    #[error("log worker queue is full")]
    Saturated,

    /// A blocking call would wait on the thread that is making it
    #[error("blocking call made from the log worker it waits on")]
    WouldDeadlock,

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Caught panic or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for linelog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the canonical error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::FileCreate { .. } => "FileCreate",
            Error::Read { .. } => "Read",
            Error::Write { .. } => "Write",
            Error::Delete { .. } => "Delete",
            Error::InvalidCategory { .. } => "InvalidCategory",
            Error::InvalidEntry(_) => "InvalidEntry",
            Error::Shutdown => "Shutdown",
            Error::Saturated => "Saturated",
            Error::WouldDeadlock => "WouldDeadlock",
            Error::Config(_) => "Config",
            Error::Internal(_) => "Internal",
        }
    }

    /// Check if this error came from the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Error::FileCreate { .. } | Error::Read { .. } | Error::Write { .. } | Error::Delete { .. }
        )
    }

    /// Check if the operation was never executed because its worker is gone.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Error::Shutdown)
    }

    /// Check if the caller supplied bad input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidCategory { .. } | Error::InvalidEntry(_))
    }

    /// Path of the file involved, for I/O errors.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::FileCreate { path, .. }
            | Error::Read { path, .. }
            | Error::Write { path, .. }
            | Error::Delete { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Kind of the underlying I/O error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::FileCreate { source, .. }
            | Error::Read { source, .. }
            | Error::Write { source, .. }
            | Error::Delete { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
