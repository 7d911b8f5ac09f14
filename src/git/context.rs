// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared git context: options, probed capabilities, repo cache.
//!
//! ```text
//! GitContext::new(options)
//!     git --version --> Capabilities
//!          |
//!          v
//! GitContext::attach(file, encoding)
//!     reject .git paths
//!     try worktree overrides, then plain
//!          |
//!          v
//!     FileObject (holds Arc<Repo>, cached here by gitdir)
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::file::FileObject;
use super::patch::{self, Hunk};
use super::repo::Repo;
use super::version::Capabilities;
use crate::error::{GitError, Result};
use crate::process::spec::{JobSpec, find_executable};
use crate::utility::paths;

/// Global flags carried by every invocation of the primary git binary.
///
/// gc.auto=0: auto-packing emits progress messages on stderr.
pub(crate) const GIT_GLOBAL_ARGS: [&str; 5] = [
    "--no-pager",
    "--no-optional-locks",
    "--literal-pathspecs",
    "-c",
    "gc.auto=0",
];

/// Diff algorithm selector, lowercased on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Minimal,
    Patience,
    Histogram,
}

impl DiffAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Myers => "myers",
            Self::Minimal => "minimal",
            Self::Patience => "patience",
            Self::Histogram => "histogram",
        }
    }
}

/// An explicit gitdir/work-tree pair tried during attachment, for setups
/// whose metadata directory lives outside the tree it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    pub gitdir: PathBuf,
    pub toplevel: PathBuf,
}

/// Options for constructing a [`GitContext`].
///
/// The crate never reads files or environment variables to build one;
/// embedders lift it from their own configuration.
#[derive(Debug, Clone, Deserialize, Builder)]
pub struct ContextOptions {
    /// Command used to invoke git.
    #[serde(default = "default_git_cmd")]
    #[builder(setters(name = with_git_cmd), default = default_git_cmd())]
    git_cmd: String,
    /// Dotfile-tracking tool tried when no ordinary repository claims a
    /// file under `$HOME`.
    #[serde(default)]
    #[builder(setters(name = with_fallback_tool))]
    fallback_tool: Option<String>,
    /// Worktree overrides tried, in order, during attachment.
    #[serde(default)]
    #[builder(setters(name = with_worktrees), default)]
    worktrees: Vec<Worktree>,
}

fn default_git_cmd() -> String {
    "git".to_string()
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ContextOptions {
    /// Get the git command name.
    #[must_use]
    pub fn git_cmd(&self) -> &str {
        &self.git_cmd
    }

    /// Get the fallback dotfile-tracking tool, if configured.
    #[must_use]
    pub fn fallback_tool(&self) -> Option<&str> {
        self.fallback_tool.as_deref()
    }

    /// Get the configured worktree overrides.
    #[must_use]
    pub fn worktrees(&self) -> &[Worktree] {
        &self.worktrees
    }
}

/// Shared state for all git operations: resolved options, probed
/// [`Capabilities`], and a cache of live [`Repo`] handles keyed by gitdir.
///
/// Construct one per host process and share it by reference.
#[derive(Debug)]
pub struct GitContext {
    options: ContextOptions,
    capabilities: Capabilities,
    repos: RwLock<BTreeMap<PathBuf, Weak<Repo>>>,
}

impl GitContext {
    /// Resolves the git binary, probes its version and builds the context.
    ///
    /// # Errors
    ///
    /// Fails when the binary cannot be found or its version line does not
    /// parse; feature gating cannot proceed without a known version.
    pub async fn new(options: ContextOptions) -> Result<Self> {
        find_executable(options.git_cmd())?;

        let output = Self::plain_job(&options).arg("--version").run().await?;
        let first_line = output.lines().first().map_or("", String::as_str);
        let capabilities = Capabilities::detect(first_line)?;

        if !capabilities.is_supported() {
            warn!(
                version = %capabilities.version(),
                "git version is older than 2.18; some operations may misbehave"
            );
        }

        Ok(Self {
            options,
            capabilities,
            repos: RwLock::new(BTreeMap::new()),
        })
    }

    /// Get the probed capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Get the options this context was built with.
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Attaches to a file, snapshotting its index state.
    ///
    /// Worktree overrides are tried in order; the first whose attachment
    /// yields an index entry wins. Paths inside a `.git` directory are
    /// rejected before any resolution.
    ///
    /// # Errors
    ///
    /// `InsideGitDir` for metadata paths, `NotARepository` when neither a
    /// repository nor the fallback tool claims the file.
    pub async fn attach(
        &self,
        file: impl AsRef<Path>,
        encoding: impl Into<String>,
    ) -> Result<FileObject> {
        let file = paths::absolute(file.as_ref())?;
        if paths::has_dot_git_component(&file) {
            return Err(GitError::InsideGitDir {
                path: file.display().to_string(),
            }
            .into());
        }

        let encoding = encoding.into();
        for worktree in self.options.worktrees() {
            if let Ok(object) =
                FileObject::new(self, file.clone(), encoding.clone(), Some(worktree)).await
                && object.props().object_name.is_some()
            {
                debug!(gitdir = %worktree.gitdir.display(), "using worktree");
                return Ok(object);
            }
        }

        FileObject::new(self, file, encoding, None).await
    }

    /// Resolves the repo containing `file`, reusing a live cached handle
    /// when one exists for the same gitdir.
    pub(crate) async fn repo(&self, file: &Path, worktree: Option<&Worktree>) -> Result<Arc<Repo>> {
        let resolved = Repo::resolve(self, file, worktree).await?;

        let mut repos = self
            .repos
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = repos.get(resolved.gitdir()).and_then(Weak::upgrade) {
            return Ok(existing);
        }
        repos.retain(|_, weak| weak.strong_count() > 0);
        let repo = Arc::new(resolved);
        repos.insert(repo.gitdir().to_path_buf(), Arc::downgrade(&repo));
        Ok(repo)
    }

    /// Diffs two on-disk files with git itself, returning parsed hunks.
    ///
    /// Serves consumers that delegate hunk computation to git over a pair
    /// of temporary files rather than diffing buffers in-process.
    ///
    /// # Errors
    ///
    /// Fails when the diff process cannot be run.
    pub async fn diff_files(
        &self,
        file_cmp: &Path,
        file_buf: &Path,
        indent_heuristic: bool,
        algorithm: DiffAlgorithm,
    ) -> Result<Vec<Hunk>> {
        let heuristic = if indent_heuristic {
            "--indent-heuristic"
        } else {
            "--no-indent-heuristic"
        };

        let output = self
            .git_job()
            .args(["-c", "core.safecrlf=false", "diff", "--color=never", heuristic])
            .arg(format!("--diff-algorithm={}", algorithm.as_str()))
            .args(["--patch-with-raw", "--unified=0"])
            .arg(file_cmp.display().to_string())
            .arg(file_buf.display().to_string())
            .run()
            .await?;

        let header = patch::hunk_header_regex()?;
        let mut hunks: Vec<Hunk> = Vec::new();
        for line in output.lines() {
            if line.starts_with("@@") {
                if let Some(hunk) = patch::parse_hunk_header(&header, line) {
                    hunks.push(hunk);
                }
            } else if let Some(current) = hunks.last_mut() {
                if let Some(rest) = line.strip_prefix('-') {
                    current.removed.lines.push(rest.to_string());
                } else if let Some(rest) = line.strip_prefix('+') {
                    current.added.lines.push(rest.to_string());
                }
            }
        }
        Ok(hunks)
    }

    /// Builds a job for the primary git binary with the global flags.
    pub(crate) fn git_job(&self) -> JobSpec {
        Self::plain_job(&self.options)
    }

    fn plain_job(options: &ContextOptions) -> JobSpec {
        JobSpec::new(options.git_cmd()).args(GIT_GLOBAL_ARGS)
    }
}
