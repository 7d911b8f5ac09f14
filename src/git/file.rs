// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-file index snapshot and index-mutating operations.
//!
//! ```text
//! FileObject = Arc<Repo> + FileProps + absolute path + encoding
//!     |
//!     +-- update_file_info  <-- ls-files --stage --others
//!     |                         --exclude-standard --eol
//!     +-- ensure_file_in_index (intent-to-add / cacheinfo)
//!     +-- stage_lines / stage_hunks / unstage_file
//!     +-- get_show_text / has_moved
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::context::{GitContext, Worktree};
use super::patch::{self, Hunk};
use super::repo::Repo;
use crate::error::{GitError, PlumbError, Result};

/// Snapshot of a file's index state.
///
/// `object_name` absent means untracked. During a conflict no primary blob
/// exists: higher-stage entries only set `has_conflicts`, while a stage-1
/// line still supplies the common ancestor's mode and hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileProps {
    /// Path relative to the toplevel.
    pub relpath: Option<String>,
    /// Pre-rename identity, set once a rename has been observed.
    pub orig_relpath: Option<String>,
    /// Blob hash of the index entry.
    pub object_name: Option<String>,
    /// File mode bits of the index entry, e.g. `100644`.
    pub mode_bits: Option<String>,
    pub has_conflicts: bool,
    /// Index content is CRLF.
    pub i_crlf: bool,
    /// Working copy content is CRLF.
    pub w_crlf: bool,
}

/// A file attached to its repository.
///
/// Exclusively owned by the attaching consumer; mutating operations take
/// `&mut self` and re-snapshot the index where the outcome matters.
#[derive(Debug)]
pub struct FileObject {
    repo: Arc<Repo>,
    file: PathBuf,
    encoding: String,
    props: FileProps,
}

impl FileObject {
    pub(crate) async fn new(
        ctx: &GitContext,
        file: PathBuf,
        encoding: String,
        worktree: Option<&Worktree>,
    ) -> Result<Self> {
        let repo = ctx.repo(&file, worktree).await?;
        let mut object = Self {
            repo,
            file,
            encoding,
            props: FileProps::default(),
        };
        object.update_file_info(true).await?;
        Ok(object)
    }

    /// Get the owning repository.
    #[must_use]
    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    /// Get the absolute file path (follows renames adopted by
    /// [`FileObject::has_moved`]).
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Get the buffer encoding this object was attached with.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Get the current index snapshot.
    #[must_use]
    pub const fn props(&self) -> &FileProps {
        &self.props
    }

    /// Get the toplevel-relative path, when known.
    #[must_use]
    pub fn relpath(&self) -> Option<&str> {
        self.props.relpath.as_deref()
    }

    /// Queries a fresh index snapshot for this file.
    async fn file_info(&self) -> Result<FileProps> {
        let output = self
            .repo
            .job([
                "-c",
                "core.quotepath=off",
                "ls-files",
                "--stage",
                "--others",
                "--exclude-standard",
                "--eol",
            ])
            .arg(self.file.display().to_string())
            .suppress_stderr()
            .run()
            .await?;

        if !output.stderr().is_empty() && !benign_ls_files_stderr(output.stderr())? {
            warn!(stderr = %output.stderr().trim_end(), "ls-files");
        }

        Ok(parse_ls_files(output.lines()))
    }

    /// Re-derives the index snapshot, replacing `relpath` only when asked
    /// and never touching `orig_relpath`.
    ///
    /// Returns whether `object_name` changed since the last snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the ls-files process cannot be run.
    pub async fn update_file_info(&mut self, update_relpath: bool) -> Result<bool> {
        let old_object_name = self.props.object_name.clone();
        let fresh = self.file_info().await?;

        if update_relpath {
            self.props.relpath = fresh.relpath;
        }
        self.props.object_name = fresh.object_name;
        self.props.mode_bits = fresh.mode_bits;
        self.props.has_conflicts = fresh.has_conflicts;
        self.props.i_crlf = fresh.i_crlf;
        self.props.w_crlf = fresh.w_crlf;

        Ok(old_object_name != self.props.object_name)
    }

    /// Makes sure the index carries an entry staging can work against.
    ///
    /// Untracked files are marked intent-to-add; a conflicted file with a
    /// stage-1 ancestor gets its index entry re-pointed at the ancestor so
    /// staging operates relative to it. Idempotent on an already-indexed,
    /// non-conflicted file.
    ///
    /// # Errors
    ///
    /// Fails when a process cannot be run, or with `NotInIndex` when a
    /// conflicted entry lacks the fields to rebuild from.
    pub async fn ensure_file_in_index(&mut self) -> Result<()> {
        if self.props.object_name.is_some() && !self.props.has_conflicts {
            return Ok(());
        }

        if self.props.object_name.is_none() {
            self.repo
                .job(["add", "--intent-to-add"])
                .arg(self.file.display().to_string())
                .run()
                .await?;
        } else {
            let (Some(mode), Some(object), Some(relpath)) = (
                self.props.mode_bits.as_deref(),
                self.props.object_name.as_deref(),
                self.props.relpath.as_deref(),
            ) else {
                return Err(GitError::NotInIndex {
                    path: self.file.display().to_string(),
                }
                .into());
            };
            let info = format!("{mode},{object},{relpath}");
            self.repo
                .job(["update-index", "--add", "--cacheinfo"])
                .arg(info)
                .run()
                .await?;
        }

        self.update_file_info(false).await?;
        Ok(())
    }

    /// Stages the given content as this file's new index entry.
    ///
    /// The blob is hashed from the lines alone, deliberately not tied to
    /// any path, then the index entry is re-pointed at it.
    ///
    /// # Errors
    ///
    /// `NotInIndex` when no mode/relpath is known yet; `CommandFailed`
    /// when hashing produces no object.
    pub async fn stage_lines(&mut self, lines: Vec<String>) -> Result<()> {
        let (Some(mode), Some(relpath)) = (
            self.props.mode_bits.clone(),
            self.props.relpath.clone(),
        ) else {
            return Err(GitError::NotInIndex {
                path: self.file.display().to_string(),
            }
            .into());
        };

        let output = self
            .repo
            .job(["hash-object", "-w", "--stdin"])
            .input_lines(lines)
            .run()
            .await?;
        let Some(new_object) = output.lines().first().cloned() else {
            return Err(GitError::CommandFailed {
                command: "hash-object".to_string(),
                message: "no object name produced".to_string(),
            }
            .into());
        };

        self.repo
            .job(["update-index", "--add", "--cacheinfo"])
            .arg(format!("{mode},{new_object},{relpath}"))
            .run()
            .await?;
        Ok(())
    }

    /// Applies the given hunks to the index only, leaving the working
    /// tree untouched. With `invert` the hunks are applied in reverse.
    ///
    /// # Errors
    ///
    /// `CommandFailed` carrying git's stderr when the patch does not
    /// apply; a zero exit with whitespace chatter on stderr is tolerated.
    pub async fn stage_hunks(&mut self, hunks: &[Hunk], invert: bool) -> Result<()> {
        self.ensure_file_in_index().await?;

        let (Some(mode), Some(relpath)) = (
            self.props.mode_bits.as_deref(),
            self.props.relpath.as_deref(),
        ) else {
            return Err(GitError::NotInIndex {
                path: self.file.display().to_string(),
            }
            .into());
        };

        let mut patch = patch::create_patch(relpath, hunks, mode, invert);
        if !self.props.i_crlf && self.props.w_crlf {
            // Line-ending conversion is on; the patch must look like the
            // working copy
            for line in &mut patch {
                line.push('\r');
            }
        }

        let output = self
            .repo
            .job(["apply", "--whitespace=nowarn", "--cached", "--unidiff-zero", "-"])
            .input_lines(patch)
            .suppress_stderr()
            .run()
            .await?;

        if !output.success() {
            return Err(GitError::CommandFailed {
                command: "apply".to_string(),
                message: output.stderr().trim_end().to_string(),
            }
            .into());
        }

        self.update_file_info(false).await?;
        Ok(())
    }

    /// Removes this file's staged changes from the index.
    ///
    /// # Errors
    ///
    /// Only when the process cannot be run; git's exit code is not
    /// interpreted.
    pub async fn unstage_file(&self) -> Result<()> {
        self.repo
            .job(["reset"])
            .arg(self.file.display().to_string())
            .run()
            .await?;
        Ok(())
    }

    /// Content lines of this file at `revision`, empty when no relpath is
    /// known yet. Carriage returns are restored when the working copy is
    /// CRLF but the blob is not.
    ///
    /// # Errors
    ///
    /// Fails when the show process cannot be run.
    pub async fn get_show_text(&self, revision: &str) -> Result<Vec<String>> {
        let Some(relpath) = self.props.relpath.as_deref() else {
            return Ok(Vec::new());
        };

        let mut lines = self
            .repo
            .get_show_text(&format!("{revision}:{relpath}"), &self.encoding)
            .await?;

        if !self.props.i_crlf && self.props.w_crlf {
            for line in &mut lines {
                line.push('\r');
            }
        }

        Ok(lines)
    }

    /// Detects a staged rename of this file and adopts the new path.
    ///
    /// Scans `diff --name-status -C --cached` for a rename whose origin is
    /// this file's pre-rename identity; the first exact match updates
    /// `orig_relpath`, `relpath` and the absolute path, and is returned.
    /// Copies and unrelated renames never match.
    ///
    /// # Errors
    ///
    /// Fails when the diff process cannot be run.
    pub async fn has_moved(&mut self) -> Result<Option<String>> {
        let Some(orig_relpath) = self
            .props
            .orig_relpath
            .clone()
            .or_else(|| self.props.relpath.clone())
        else {
            return Ok(None);
        };

        let output = self
            .repo
            .job(["diff", "--name-status", "-C", "--cached"])
            .run()
            .await?;

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() == 3 && parts[0].starts_with('R') && parts[1] == orig_relpath {
                let new = parts[2].to_string();
                self.props.orig_relpath = Some(orig_relpath);
                self.props.relpath = Some(new.clone());
                self.file = self.repo.toplevel().join(&new);
                debug!(relpath = %new, "file moved");
                return Ok(Some(new));
            }
        }
        Ok(None)
    }
}

/// `ls-files --others` complains when asked about a path in a directory
/// that does not exist; that alone is not reportable.
pub(crate) fn benign_ls_files_stderr(stderr: &str) -> Result<bool> {
    let benign = Regex::new("^warning: could not open directory .*: No such file or directory")
        .map_err(|e| PlumbError::other(format!("benign stderr pattern: {e}")))?;
    Ok(benign.is_match(stderr))
}

/// Folds `ls-files --stage --others --exclude-standard --eol` output into
/// a snapshot. Tracked lines carry three tab-separated fields (mode/hash/
/// stage, eol attributes, relpath); untracked lines two (eol attributes,
/// relpath).
pub(crate) fn parse_ls_files(lines: &[String]) -> FileProps {
    let mut props = FileProps::default();
    for line in lines {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() > 2 {
            let mut eol = parts[1].split_whitespace();
            props.i_crlf = eol.next() == Some("i/crlf");
            props.w_crlf = eol.next() == Some("w/crlf");
            props.relpath = Some(parts[2].to_string());

            let attrs: Vec<&str> = parts[0].split_whitespace().collect();
            let stage = attrs
                .get(2)
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0);
            if stage <= 1 {
                props.mode_bits = attrs.first().map(|&s| s.to_string());
                props.object_name = attrs.get(1).map(|&s| s.to_string());
            } else {
                props.has_conflicts = true;
            }
        } else if parts.len() == 2 {
            props.relpath = Some(parts[1].to_string());
        }
    }
    props
}
