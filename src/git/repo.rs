// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository resolution and repo-scoped command execution.
//!
//! ```text
//! resolve: rev-parse --show-toplevel <gitdir-flag> --abbrev-ref HEAD
//!    |         (one retry with the fallback tool for $HOME dotfiles)
//!    v
//! Repo { toplevel, gitdir, abbrev_head, detached, username }
//!    |
//!    v
//! job(): git <globals> --git-dir G [--work-tree T] <args>   cwd = toplevel
//! ```

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::context::{GIT_GLOBAL_ARGS, GitContext, Worktree};
use crate::error::{GitError, Result};
use crate::process::spec::{JobOutput, JobSpec};

/// A resolved repository.
///
/// Created once per distinct gitdir and shared via `Arc`; the cache in
/// [`GitContext`] holds it weakly, so a repo dies with its last file
/// object.
#[derive(Debug)]
pub struct Repo {
    toplevel: PathBuf,
    gitdir: PathBuf,
    abbrev_head: RwLock<String>,
    detached: bool,
    username: String,
    git_cmd: String,
}

/// Raw output of the combined resolution query.
struct Resolution {
    toplevel: PathBuf,
    gitdir: PathBuf,
    abbrev_head: String,
}

impl Repo {
    /// Resolves the repository containing `file`.
    ///
    /// With a worktree override the query runs from the override toplevel
    /// with its gitdir/work-tree injected. Without one, and when no
    /// repository claims the file, a configured fallback tool is probed
    /// for files under `$HOME` and the resolution retried through it.
    ///
    /// # Errors
    ///
    /// `NotARepository` when every avenue comes up empty.
    pub(crate) async fn resolve(
        ctx: &GitContext,
        file: &Path,
        worktree: Option<&Worktree>,
    ) -> Result<Self> {
        let git_cmd = ctx.options().git_cmd();

        if let Some(resolution) = Self::resolve_with(ctx, git_cmd, file, worktree).await? {
            return Self::from_resolution(git_cmd, resolution).await;
        }

        if worktree.is_none()
            && let Some(tool) = ctx.options().fallback_tool()
            && fallback_tracks(tool, file).await
            && let Some(resolution) = Self::resolve_with(ctx, tool, file, None).await?
        {
            // The stored gitdir addresses the tool's repository; every
            // later command still goes through the primary git.
            return Self::from_resolution(git_cmd, resolution).await;
        }

        Err(GitError::NotARepository {
            path: file.display().to_string(),
        }
        .into())
    }

    /// Runs the combined resolution query, returning `None` when the path
    /// is not inside a repository known to `command`.
    async fn resolve_with(
        ctx: &GitContext,
        command: &str,
        file: &Path,
        worktree: Option<&Worktree>,
    ) -> Result<Option<Resolution>> {
        let cwd = worktree.map_or_else(
            || {
                file.parent()
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf()
            },
            |wt| wt.toplevel.clone(),
        );

        let absolute_gitdir = ctx.capabilities().supports_absolute_gitdir();
        let gitdir_flag = if absolute_gitdir {
            "--absolute-git-dir"
        } else {
            "--git-dir"
        };

        let mut job = plumbing_job(command, ctx.options().git_cmd());
        if let Some(wt) = worktree {
            job = job
                .arg("--git-dir")
                .arg(wt.gitdir.display().to_string())
                .arg("--work-tree")
                .arg(wt.toplevel.display().to_string());
        }
        let output = job
            .args(["rev-parse", "--show-toplevel", gitdir_flag, "--abbrev-ref", "HEAD"])
            .cwd(&cwd)
            .suppress_stderr()
            .run()
            .await?;

        let lines = output.into_lines();
        if lines.len() < 3 {
            return Ok(None);
        }

        let toplevel = PathBuf::from(&lines[0]);
        let mut gitdir = PathBuf::from(&lines[1]);
        if !absolute_gitdir {
            // Old git prints the gitdir relative to the query directory
            gitdir = tokio::fs::canonicalize(cwd.join(&gitdir)).await?;
        }

        let abbrev_head = resolve_label(ctx.options().git_cmd(), &gitdir, &lines[2], &cwd).await?;

        Ok(Some(Resolution {
            toplevel,
            gitdir,
            abbrev_head,
        }))
    }

    async fn from_resolution(git_cmd: &str, resolution: Resolution) -> Result<Self> {
        let detached = resolution.gitdir != resolution.toplevel.join(".git");
        let mut repo = Self {
            toplevel: resolution.toplevel,
            gitdir: resolution.gitdir,
            abbrev_head: RwLock::new(resolution.abbrev_head),
            detached,
            username: String::new(),
            git_cmd: git_cmd.to_string(),
        };

        let output = repo
            .job(["config", "user.name"])
            .suppress_stderr()
            .run()
            .await?;
        repo.username = output.lines().first().cloned().unwrap_or_default();

        Ok(repo)
    }

    /// Get the work-tree root.
    #[must_use]
    pub fn toplevel(&self) -> &Path {
        &self.toplevel
    }

    /// Get the metadata directory.
    #[must_use]
    pub fn gitdir(&self) -> &Path {
        &self.gitdir
    }

    /// Whether the metadata directory lives outside `toplevel/.git`.
    #[must_use]
    pub const fn detached(&self) -> bool {
        self.detached
    }

    /// Repo-scoped `user.name`, empty when unconfigured.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current-ref label: branch name, short hash when detached, empty
    /// before the first commit, with `(rebasing)` appended mid-rebase.
    #[must_use]
    pub fn abbrev_head(&self) -> String {
        self.abbrev_head
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds a repo-scoped job: primary git, global flags, gitdir (and
    /// work-tree when detached) injected, cwd pinned to the toplevel.
    pub(crate) fn job<I, S>(&self, args: I) -> JobSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut job = JobSpec::new(&self.git_cmd)
            .args(GIT_GLOBAL_ARGS)
            .arg("--git-dir")
            .arg(self.gitdir.display().to_string());
        if self.detached {
            job = job
                .arg("--work-tree")
                .arg(self.toplevel.display().to_string());
        }
        job.args(args).cwd(&self.toplevel)
    }

    /// Runs a repo-scoped git command.
    ///
    /// # Errors
    ///
    /// Only when the process cannot be run; exit codes are surfaced in the
    /// output, not interpreted.
    pub async fn command<I, S>(&self, args: I) -> Result<JobOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job(args).run().await
    }

    /// Re-derives the current-ref label without re-resolving
    /// toplevel/gitdir.
    ///
    /// # Errors
    ///
    /// Fails when the underlying queries cannot be run.
    pub async fn update_abbrev_head(&self) -> Result<()> {
        let output = self
            .job(["rev-parse", "--abbrev-ref", "HEAD"])
            .suppress_stderr()
            .run()
            .await?;
        let raw = output.lines().first().map_or("", String::as_str);
        let label = resolve_label(&self.git_cmd, &self.gitdir, raw, &self.toplevel).await?;
        *self
            .abbrev_head
            .write()
            .unwrap_or_else(PoisonError::into_inner) = label;
        Ok(())
    }

    /// Paths whose working tree differs from the index (second porcelain
    /// status column `M`), regardless of staged state.
    ///
    /// # Errors
    ///
    /// Fails when the status process cannot be run.
    pub async fn files_changed(&self) -> Result<Vec<String>> {
        let output = self
            .job(["status", "--porcelain", "--ignore-submodules"])
            .run()
            .await?;
        Ok(output
            .lines()
            .iter()
            .filter(|line| line.as_bytes().get(1) == Some(&b'M'))
            .filter_map(|line| line.get(3..))
            .map(str::to_string)
            .collect())
    }

    /// Raw content lines of `show <object>`, decoded per `encoding`.
    ///
    /// A missing blob is not an error: git's complaint is logged at debug
    /// level and an empty vector returned.
    ///
    /// # Errors
    ///
    /// Fails when the show process cannot be run.
    pub async fn get_show_text(&self, object: &str, encoding: &str) -> Result<Vec<String>> {
        let output = self
            .job(["show", object])
            .encoding(encoding)
            .suppress_stderr()
            .run()
            .await?;
        if !output.stderr().is_empty() {
            debug!(object, stderr = %output.stderr().trim_end(), "show");
        }
        Ok(output.into_lines())
    }
}

/// Substitutes a short hash for a literal `HEAD` label (detached or
/// unborn; empty when there are no commits), then appends `(rebasing)`
/// when the gitdir carries a rebase state directory.
async fn resolve_label(git_cmd: &str, gitdir: &Path, raw: &str, cwd: &Path) -> Result<String> {
    let mut label = raw.to_string();
    if raw == "HEAD" {
        let output = JobSpec::new(git_cmd)
            .args(GIT_GLOBAL_ARGS)
            .args(["rev-parse", "--short", "HEAD"])
            .cwd(cwd)
            .suppress_stderr()
            .run()
            .await?;
        label = output.lines().first().cloned().unwrap_or_default();
    }

    if path_exists(gitdir.join("rebase-merge")).await
        || path_exists(gitdir.join("rebase-apply")).await
    {
        label.push_str("(rebasing)");
    }

    Ok(label)
}

async fn path_exists(path: PathBuf) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Probes whether the fallback tool tracks `file`. Only files under
/// `$HOME` qualify; probe failures count as untracked.
async fn fallback_tracks(tool: &str, file: &Path) -> bool {
    let Some(home) = std::env::var_os("HOME") else {
        return false;
    };
    if !file.starts_with(&home) {
        return false;
    }
    match JobSpec::new(tool)
        .arg("ls-files")
        .arg(file.display().to_string())
        .suppress_stderr()
        .run()
        .await
    {
        Ok(output) => !output.lines().is_empty(),
        Err(e) => {
            debug!(tool, error = %e, "fallback tool probe failed");
            false
        }
    }
}

/// Global flags apply only to the primary git binary, never to a
/// fallback tool.
fn plumbing_job(command: &str, primary_git: &str) -> JobSpec {
    let mut job = JobSpec::new(command);
    if command == primary_git {
        job = job.args(GIT_GLOBAL_ARGS);
    }
    job
}
