// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! encoding
//!   encoding_for_label()  "latin1"/"shift_jis"/... --> encoding_rs handle
//!   bytes_to_utf8()       declared encoding --> UTF-8 (lossy fallback)
//! paths
//!   absolute()            cwd-anchored absolute path, no symlink resolution
//!   has_dot_git_component()
//! ```

pub mod encoding;
pub mod paths;
