// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Job specification and captured output.
//!
//! ```text
//! JobSpec
//!  • new(command)
//!  • args/arg/cwd/input_lines/suppress_stderr/encoding
//!  • run() --> JobOutput
//!
//! JobOutput: lines (split stdout), stderr (verbatim), exit_code
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::error::ProcessError;

/// Static cache for executable paths resolved via `which`.
static EXECUTABLE_CACHE: OnceLock<RwLock<BTreeMap<String, PathBuf>>> = OnceLock::new();

/// Get the executable cache, initializing if needed.
fn exe_cache() -> &'static RwLock<BTreeMap<String, PathBuf>> {
    EXECUTABLE_CACHE.get_or_init(|| RwLock::new(BTreeMap::new()))
}

/// Finds the full path to an executable in PATH.
///
/// Results are cached for subsequent lookups of the same name.
///
/// # Errors
///
/// Returns a `ProcessError::ExecutableNotFound` if the executable is not in
/// PATH.
pub fn find_executable(program: &str) -> std::result::Result<PathBuf, ProcessError> {
    // Check cache first (read lock)
    {
        let cache = exe_cache()
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(path) = cache.get(program) {
            return Ok(path.clone());
        }
    }

    // Not in cache, resolve via which
    which::which(program).map_or_else(
        |_| {
            Err(ProcessError::ExecutableNotFound {
                name: program.to_string(),
            })
        },
        |path| {
            // Cache the result (write lock)
            {
                let mut cache = exe_cache()
                    .write()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                cache.insert(program.to_string(), path.clone());
            }
            Ok(path)
        },
    )
}

/// Output from a completed job.
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    lines: Vec<String>,
    stderr: String,
    exit_code: i32,
}

impl JobOutput {
    /// Creates a new `JobOutput` (for internal use).
    pub(super) const fn new(lines: Vec<String>, stderr: String, exit_code: i32) -> Self {
        Self {
            lines,
            stderr,
            exit_code,
        }
    }

    /// Returns the split stdout lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the output, returning the stdout lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Returns captured stderr, verbatim.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Returns the process exit code (0 = success).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Returns true if the process exited successfully (code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Specification for one external process invocation.
///
/// Ephemeral: build one per command, consume it with [`JobSpec::run`].
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Command name, resolved via PATH when `run()` is called
    command: String,
    /// Command-line arguments
    args: Vec<String>,
    /// Working directory
    cwd: Option<PathBuf>,
    /// Lines written to stdin, each followed by a newline
    input_lines: Option<Vec<String>>,
    /// Don't log non-empty stderr as a warning
    suppress_stderr: bool,
    /// Encoding label stdout lines are decoded from (default: utf-8)
    encoding: Option<String>,
}

impl JobSpec {
    /// Creates a new `JobSpec` for the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            input_lines: None,
            suppress_stderr: false,
            encoding: None,
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.args.push(arg.into());
        }
        self
    }

    /// Sets the working directory for the process.
    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Feeds the given lines to the process's stdin, each followed by a
    /// newline; the stream is closed afterwards.
    #[must_use]
    pub fn input_lines(mut self, lines: Vec<String>) -> Self {
        self.input_lines = Some(lines);
        self
    }

    /// Don't log non-empty stderr as a warning; it is still returned in the
    /// [`JobOutput`] for the caller to inspect.
    #[must_use]
    pub const fn suppress_stderr(mut self) -> Self {
        self.suppress_stderr = true;
        self
    }

    /// Sets the encoding label stdout lines are decoded from.
    #[must_use]
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Returns the command name.
    pub(super) fn command(&self) -> &str {
        &self.command
    }

    /// Returns the arguments as a slice.
    pub(super) fn args_slice(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory, if set.
    pub(super) fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Returns the stdin lines, if set.
    pub(super) fn input(&self) -> Option<&[String]> {
        self.input_lines.as_deref()
    }

    /// Returns whether stderr warnings are suppressed.
    pub(super) const fn suppresses_stderr(&self) -> bool {
        self.suppress_stderr
    }

    /// Returns the declared stdout encoding label, if set.
    pub(super) fn encoding_label(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}
