// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            PlumbError (~24 bytes)
//!                  |
//!     +--------+---+----+--------+--------+
//!     |        |        |        |        |
//!     v        v        v        v        v
//!  Version    Git    Process     Io     Other
//!   Box       Box      Box      Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Version  InvalidVersion
//!   Git      NotARepository, InsideGitDir, CommandFailed, NotInIndex
//!   Process  ExecutableNotFound, SpawnFailed, IoFailed
//!
//! All variants boxed => PlumbError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Result type using [`PlumbError`].
pub type Result<T> = std::result::Result<T, PlumbError>;

/// Top-level error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum PlumbError {
    /// Version string could not be parsed; feature gating cannot proceed.
    #[error("version error: {0}")]
    Version(#[from] Box<VersionError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Process execution failed.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl PlumbError {
    /// Create a generic [`PlumbError::Other`] from a message.
    pub(crate) fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for PlumbError {
                fn from(err: $error) -> Self {
                    PlumbError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    VersionError => Version,
    GitError => Git,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Version Errors ---

/// Version gate errors.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Version string does not match `major.minor.(patch|marker)`.
    #[error("invalid version string: '{input}'")]
    InvalidVersion { input: String },
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository (and no fallback tool) claims the path.
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    /// The path lies inside a repository's metadata directory.
    #[error("path is inside a .git directory: {path}")]
    InsideGitDir { path: String },

    /// Git command exited unsuccessfully where success was required.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Operation needs an index entry the file does not have.
    #[error("file has no index entry: {path}")]
    NotInIndex { path: String },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to feed input to or collect status from a running process.
    #[error("process i/o failed for '{command}': {source}")]
    IoFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests;
