//! Application error type using thiserror
//!
//! Every failure in an update run is a `BuildError`. The variants only group
//! failures by cause; each one carries a human-readable message:
//! - Environment: preconditions on the working tree were not met
//! - Process: an external program (release helper, gpg) failed
//! - Integrity: upstream content does not look the way it should
//! - Transport: an HTTP download failed
//! - Io: file system operation failures

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BuildError>;

/// Application-level error type
#[derive(Error, Debug)]
pub enum BuildError {
    /// A precondition on the local working tree was not met
    #[error("{message}")]
    Environment { message: String },

    /// An external process could not be run or reported failure
    #[error("{program}: {message}")]
    Process { program: String, message: String },

    /// Upstream data did not match what the packaging expects
    #[error("{message}")]
    Integrity { message: String },

    /// A download did not succeed
    #[error("failed to download url: {url} ({message})")]
    Transport { url: String, message: String },

    /// Version string could not be parsed
    #[error("invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    /// Requested version is not among the upstream releases
    #[error("version '{requested}' not found or not valid - available versions: {available:?}")]
    VersionNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// File system errors
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Creates a new Environment error
    pub fn environment(message: impl Into<String>) -> Self {
        BuildError::Environment {
            message: message.into(),
        }
    }

    /// Creates a new Process error
    pub fn process(program: impl Into<String>, message: impl Into<String>) -> Self {
        BuildError::Process {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Creates a new Integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        BuildError::Integrity {
            message: message.into(),
        }
    }

    /// Creates a new Transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        BuildError::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(value: impl Into<String>, message: impl Into<String>) -> Self {
        BuildError::InvalidVersion {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}
