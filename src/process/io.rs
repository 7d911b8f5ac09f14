// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O capture and stdin feeding for jobs.
//!
//! ```text
//! run_child()
//!   stdout/stderr capture tasks (read_to_end)
//!   feed input lines, close stdin
//!   wait
//!   --> split stdout on '\n' bytes, drop one trailing empty element
//!   --> decode lines per declared encoding
//! ```

use encoding_rs::Encoding;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::spec::{JobOutput, JobSpec};
use crate::error::{ProcessError, Result};
use crate::utility::encoding;

/// Spawns a task that drains a stream to completion.
fn spawn_capture<R>(stream: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    stream.map(|mut stream| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stream.read_to_end(&mut buf).await {
                warn!(error = %e, "error reading stream");
            }
            buf
        })
    })
}

/// Waits for a capture task, returning its bytes.
async fn await_capture(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Splits raw stdout on newline bytes and decodes each line.
///
/// A single empty element produced by a trailing newline is dropped;
/// interior empty lines and carriage returns are preserved.
pub(super) fn split_stdout(bytes: &[u8], encoding: Option<&'static Encoding>) -> Vec<String> {
    let mut raw: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
    if let Some(last) = raw.last()
        && last.is_empty()
    {
        raw.pop();
    }
    raw.into_iter()
        .map(|line| encoding::bytes_to_utf8(encoding, line).into_owned())
        .collect()
}

impl JobSpec {
    /// Runs the child process, feeding stdin and capturing output.
    pub(super) async fn run_child(&self, cmd_line: &str, child: &mut Child) -> Result<JobOutput> {
        let stdout_handle = spawn_capture(child.stdout.take());
        let stderr_handle = spawn_capture(child.stderr.take());

        self.write_input(cmd_line, child).await?;

        let exit_status = child
            .wait()
            .await
            .map_err(|source| ProcessError::IoFailed {
                command: cmd_line.to_string(),
                source,
            })?;

        let stdout = await_capture(stdout_handle).await;
        let stderr = await_capture(stderr_handle).await;

        let enc = self.resolve_encoding();
        Ok(JobOutput::new(
            split_stdout(&stdout, enc),
            String::from_utf8_lossy(&stderr).into_owned(),
            exit_status.code().unwrap_or(-1),
        ))
    }

    /// Resolves the declared encoding label, if any, to a decoder handle.
    fn resolve_encoding(&self) -> Option<&'static Encoding> {
        let label = self.encoding_label()?;
        let enc = encoding::encoding_for_label(label);
        if enc.is_none() && !encoding::is_utf8_label(label) {
            debug!(encoding = %label, "unknown encoding label, assuming utf-8");
        }
        enc
    }

    /// Writes the input lines to the child's stdin, then closes it.
    async fn write_input(&self, cmd_line: &str, child: &mut Child) -> Result<()> {
        if let Some(lines) = self.input()
            && let Some(mut stdin) = child.stdin.take()
        {
            match feed_lines(&mut stdin, lines).await {
                // A child may exit before consuming all input; its exit
                // code and stderr carry the story in that case.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    trace!(cmd = %cmd_line, "stdin closed early");
                }
                Err(source) => {
                    return Err(ProcessError::IoFailed {
                        command: cmd_line.to_string(),
                        source,
                    }
                    .into());
                }
                Ok(()) => {}
            }
        }
        Ok(())
    }
}

/// Writes each line followed by a newline.
async fn feed_lines(stdin: &mut ChildStdin, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
    }
    stdin.shutdown().await
}
