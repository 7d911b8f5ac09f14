// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async one-shot job execution.
//!
//! ```text
//! JobSpec::new("git")
//!   .args() .cwd() .input_lines() .suppress_stderr() .encoding()
//!   .run()
//!       --> tokio::process::Command
//!           capture stdout/stderr, feed input lines
//!       --> JobOutput { lines, stderr, exit_code }
//! ```
//!
//! Stdout is split on newline bytes with a single trailing empty element
//! dropped, so `lines` mirrors what the tool printed; carriage returns are
//! preserved for CRLF-aware callers. Exit codes are carried, never
//! interpreted.

pub mod spec;

mod io;
mod runner;

#[cfg(test)]
mod tests;
