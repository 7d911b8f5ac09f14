// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                      GitContext
//!            options, capabilities, repo cache
//!                          |
//!                 attach(file, encoding)
//!                          |
//!                          v
//!                      FileObject -----> Arc<Repo>
//!              index state, staging,   toplevel/gitdir,
//!              show/blame/rename      head label, username
//!                          |
//!                          v
//!              ,-----------------------,
//!              |          git          |
//!              |  blame  patch  version|
//!              '-----------+-----------'
//!                          |
//!                          v
//!                 process   JobSpec/run
//!              spawn, feed stdin, decode
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod error;
pub mod git;
pub mod logging;
pub mod process;
pub mod utility;
