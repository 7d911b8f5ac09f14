// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unified-diff patch construction for index-only staging.
//!
//! ```text
//! [Hunk] --> create_patch() --> minimal zero-context patch lines
//!                                     |
//!                                     v
//!                     apply --cached --unidiff-zero -   (file.rs)
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PlumbError, Result};

/// One side of a hunk: a line range plus its literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkRange {
    pub start: u32,
    pub count: u32,
    pub lines: Vec<String>,
}

/// A contiguous change between two versions of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub removed: HunkRange,
    pub added: HunkRange,
}

/// The shape of a hunk, derived from which side is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkKind {
    Add,
    Change,
    Delete,
}

impl Hunk {
    /// Classifies the hunk. An empty post-image wins over an empty
    /// pre-image, so a degenerate both-empty hunk is a delete.
    #[must_use]
    pub const fn kind(&self) -> HunkKind {
        if self.added.count == 0 {
            HunkKind::Delete
        } else if self.removed.count == 0 {
            HunkKind::Add
        } else {
            HunkKind::Change
        }
    }
}

/// Matches `@@ -a[,b] +c[,d] @@`; missing counts default to 1.
pub(crate) const HUNK_HEADER_PATTERN: &str = r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@";

/// Builds a minimal unified-diff patch covering exactly the given hunks.
///
/// Old and new line numbers both start from each hunk's pre-image range;
/// a running offset keeps later hunk headers consistent as earlier hunks
/// grow or shrink the file. Pure additions insert *after* the old line, so
/// their start is bumped by one. With `invert` the removed/added roles
/// swap, producing the patch that undoes the original.
#[must_use]
pub fn create_patch(relpath: &str, hunks: &[Hunk], mode_bits: &str, invert: bool) -> Vec<String> {
    let mut patch = vec![
        format!("diff --git a/{relpath} b/{relpath}"),
        format!("index 000000..000000 {mode_bits}"),
        format!("--- a/{relpath}"),
        format!("+++ b/{relpath}"),
    ];

    let mut offset: i64 = 0;

    for hunk in hunks {
        let mut start = hunk.removed.start;
        if hunk.kind() == HunkKind::Add {
            start += 1;
        }

        let (pre_count, pre_lines, now_count, now_lines) = if invert {
            (
                hunk.added.count,
                &hunk.added.lines,
                hunk.removed.count,
                &hunk.removed.lines,
            )
        } else {
            (
                hunk.removed.count,
                &hunk.removed.lines,
                hunk.added.count,
                &hunk.added.lines,
            )
        };

        let now_start = i64::from(start) + offset;
        patch.push(format!("@@ -{start},{pre_count} +{now_start},{now_count} @@"));
        for line in pre_lines {
            patch.push(format!("-{line}"));
        }
        for line in now_lines {
            patch.push(format!("+{line}"));
        }

        offset += i64::from(now_count) - i64::from(pre_count);
    }

    patch
}

/// Parses a unified-diff hunk header into an empty-bodied hunk.
///
/// Returns `Ok(None)` for lines that are not hunk headers. Line text is
/// filled in by the caller walking the diff body.
///
/// # Errors
///
/// Only on an internal pattern-compilation failure.
pub fn parse_diff_line(line: &str) -> Result<Option<Hunk>> {
    let header = hunk_header_regex()?;
    Ok(parse_hunk_header(&header, line))
}

pub(crate) fn hunk_header_regex() -> Result<Regex> {
    Regex::new(HUNK_HEADER_PATTERN)
        .map_err(|e| PlumbError::other(format!("hunk header pattern: {e}")))
}

pub(crate) fn parse_hunk_header(header: &Regex, line: &str) -> Option<Hunk> {
    let caps = header.captures(line)?;
    let group = |index: usize, default: u32| {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default)
    };
    Some(Hunk {
        removed: HunkRange {
            start: group(1, 0),
            count: group(2, 1),
            lines: Vec::new(),
        },
        added: HunkRange {
            start: group(3, 0),
            count: group(4, 1),
            lines: Vec::new(),
        },
    })
}
