// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Job execution and lifecycle.
//!
//! ```text
//! run()
//!    |
//!    v
//! build_command()
//! args, cwd, stdio
//!    |
//!    v
//! spawn()
//! capture stdout/stderr, feed input lines
//! wait
//!    |
//!    v
//! JobOutput { lines, stderr, exit_code }
//! ```

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::spec::{JobOutput, JobSpec, find_executable};
use crate::error::{ProcessError, Result};

impl JobSpec {
    /// Returns the display name for this job.
    fn display_name(&self) -> String {
        Path::new(self.command()).file_stem().map_or_else(
            || "process".to_string(),
            |s| s.to_string_lossy().into_owned(),
        )
    }

    /// Returns the full command line as a string (for logging).
    pub(super) fn command_line(&self) -> String {
        let mut cmd = self.command().to_string();
        for arg in self.args_slice() {
            use std::fmt::Write as _;
            if arg.contains(' ') {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns the process, feeds it input, and waits for completion.
    ///
    /// Only the calling task suspends; the runtime keeps driving other
    /// tasks while the child runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable cannot be resolved, spawning
    /// fails, or feeding stdin / collecting the exit status hits an I/O
    /// error. A non-zero exit is not an error: the code is surfaced in the
    /// [`JobOutput`] for the caller to interpret.
    pub async fn run(self) -> Result<JobOutput> {
        let program = find_executable(self.command())?;
        let name = self.display_name();
        let cmd_line = self.command_line();

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        // Build the tokio Command
        let mut command = self.build_command(&program);

        // Spawn the process
        let mut child = command.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: cmd_line.clone(),
            source,
        })?;

        let pid = child.id();
        trace!(process = %name, pid = ?pid, "spawned");

        // Run the process, capturing output
        let output = self.run_child(&cmd_line, &mut child).await?;

        if !self.suppresses_stderr() && !output.stderr().is_empty() {
            warn!(cmd = %cmd_line, stderr = %output.stderr().trim_end(), "process stderr");
        }

        trace!(process = %name, exit_code = output.exit_code(), "completed");
        Ok(output)
    }

    /// Builds the tokio Command from this spec's configuration.
    fn build_command(&self, program: &Path) -> Command {
        let mut command = Command::new(program);

        // Arguments
        command.args(self.args_slice());

        // Working directory
        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }

        // Stdin
        if self.input().is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }

        // Output capture
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        // Kill on drop for safety
        command.kill_on_drop(true);

        command
    }
}
