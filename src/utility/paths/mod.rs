// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path helpers for repository discovery.

use std::path::{Component, Path, PathBuf};

/// Anchors a path to the current working directory without touching the
/// filesystem. Unlike canonicalization this neither resolves symlinks nor
/// requires the path to exist, which matters for buffers of files not yet
/// written to disk.
///
/// # Errors
///
/// Returns an error when the path is empty or the working directory cannot
/// be determined.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Returns whether any component of the path is the metadata directory
/// itself. Files inside it (`COMMIT_EDITMSG`, blobs under `objects/`) must
/// never be attached to.
///
/// # Example
/// ```
/// use gitplumb::utility::paths::has_dot_git_component;
/// use std::path::Path;
///
/// assert!(has_dot_git_component(Path::new("/repo/.git/COMMIT_EDITMSG")));
/// assert!(!has_dot_git_component(Path::new("/repo/src/main.rs")));
/// ```
#[must_use]
pub fn has_dot_git_component(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == ".git"))
}
