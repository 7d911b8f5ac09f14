// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-line blame against in-memory buffer content.
//!
//! ```text
//! run_blame(lines, lnum)
//!     untracked / no commits --> synthetic "Not Committed Yet" record
//!     otherwise --> blame --contents - -L n,+1 --line-porcelain
//!                        |
//!                        v
//!                  header: sha orig_lnum final_lnum
//!                  key value pairs (fixed mapping)
//!                  tab-prefixed content (skipped)
//! ```

use serde::Serialize;

use super::file::FileObject;
use crate::error::Result;

/// Authorship of one line, as reported by blame porcelain.
///
/// Produced fresh per query, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlameInfo {
    pub sha: String,
    pub abbrev_sha: String,
    pub orig_lnum: u32,
    pub final_lnum: u32,
    pub author: String,
    pub author_mail: String,
    pub author_time: i64,
    pub author_tz: Option<String>,
    pub committer: String,
    pub committer_mail: String,
    pub committer_time: i64,
    pub committer_tz: Option<String>,
    pub summary: String,
    pub previous_sha: Option<String>,
    pub previous_filename: Option<String>,
    pub filename: Option<String>,
}

impl BlameInfo {
    /// Synthetic record for content git has never seen.
    pub(crate) fn not_committed(lnum: u32) -> Self {
        let now = unix_now();
        Self {
            sha: "0".repeat(40),
            abbrev_sha: "0".repeat(8),
            orig_lnum: 0,
            final_lnum: lnum,
            author: "Not Committed Yet".to_string(),
            author_mail: "<not.committed.yet>".to_string(),
            author_time: now,
            committer: "Not Committed Yet".to_string(),
            committer_mail: "<not.committed.yet>".to_string(),
            committer_time: now,
            ..Self::default()
        }
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

impl FileObject {
    /// Blames line `lnum` of the given buffer content.
    ///
    /// Untracked files and commit-less repositories get a synthetic
    /// record without any process call. `Ok(None)` means blame produced
    /// no output (line out of range against the given content).
    ///
    /// # Errors
    ///
    /// Fails when the blame process cannot be run.
    pub async fn run_blame(
        &self,
        lines: &[String],
        lnum: u32,
        ignore_whitespace: bool,
    ) -> Result<Option<BlameInfo>> {
        if self.props().object_name.is_none() || self.repo().abbrev_head().is_empty() {
            return Ok(Some(BlameInfo::not_committed(lnum)));
        }

        let mut job = self
            .repo()
            .job(["blame", "--contents", "-", "-L"])
            .arg(format!("{lnum},+1"))
            .arg("--line-porcelain");
        if ignore_whitespace {
            job = job.arg("-w");
        }
        let ignore_revs = self.repo().toplevel().join(".git-blame-ignore-revs");
        if tokio::fs::try_exists(&ignore_revs).await.unwrap_or(false) {
            job = job
                .arg("--ignore-revs-file")
                .arg(ignore_revs.display().to_string());
        }

        let output = job
            .arg(self.file().display().to_string())
            .input_lines(lines.to_vec())
            .run()
            .await?;

        Ok(parse_blame(output.lines()))
    }
}

/// Parses `--line-porcelain` output for a single line.
///
/// Header fields that fail to parse become 0. Hyphens in keys normalize
/// to underscores; keys outside the fixed mapping are ignored.
pub(crate) fn parse_blame(lines: &[String]) -> Option<BlameInfo> {
    let (header, rest) = lines.split_first()?;

    let mut fields = header.split(' ');
    let sha = fields.next().unwrap_or_default().to_string();
    let orig_lnum = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let final_lnum = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    let mut info = BlameInfo {
        abbrev_sha: sha.chars().take(8).collect(),
        sha,
        orig_lnum,
        final_lnum,
        ..BlameInfo::default()
    };

    for line in rest {
        if line.starts_with('\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(' ') else {
            continue;
        };
        match key.replace('-', "_").as_str() {
            "author" => info.author = value.to_string(),
            "author_mail" => info.author_mail = value.to_string(),
            "author_time" => info.author_time = value.parse().unwrap_or(0),
            "author_tz" => info.author_tz = Some(value.to_string()),
            "committer" => info.committer = value.to_string(),
            "committer_mail" => info.committer_mail = value.to_string(),
            "committer_time" => info.committer_time = value.parse().unwrap_or(0),
            "committer_tz" => info.committer_tz = Some(value.to_string()),
            "summary" => info.summary = value.to_string(),
            "filename" => info.filename = Some(value.to_string()),
            "previous" => {
                if let Some((sha, filename)) = value.split_once(' ') {
                    info.previous_sha = Some(sha.to_string());
                    info.previous_filename = Some(filename.to_string());
                } else {
                    info.previous_sha = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    Some(info)
}
