// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git data-access module.
//!
//! ```text
//!          GitContext (context.rs)
//!          options + capabilities + repo cache
//!               |
//!               | attach(file, encoding)
//!               v
//!          FileObject (file.rs)
//!          index snapshot: hash, mode, conflicts, eol
//!            |       |         |
//!            |       |         +-- run_blame (blame.rs)
//!            |       +-- stage_hunks <-- create_patch (patch.rs)
//!            v
//!          Arc<Repo> (repo.rs)
//!          toplevel / gitdir / abbrev_head / username
//!               |
//!               v
//!          JobSpec --> git   (version gated by version.rs)
//! ```
//!
//! Everything here shells out to the git CLI; no repository format
//! knowledge lives in-process.

pub mod blame;
pub mod context;
pub mod file;
pub mod patch;
pub mod repo;
pub mod version;

#[cfg(test)]
mod tests;
