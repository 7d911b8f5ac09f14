// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git version parsing and feature gates.
//!
//! ```text
//! "git version 2.43.0" --> GitVersion { 2, 43, 0 }
//!                               |
//!                               v
//!                         Capabilities
//!                          .supports_absolute_gitdir   >= 2.13
//!                          .is_supported               >= 2.18
//! ```

use tracing::debug;

use crate::error::VersionError;

/// A parsed git version.
///
/// The third component of a development build reads `GIT` and parses as
/// patch 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Parses a `major.minor.(patch|marker)` version string.
    ///
    /// Components beyond the third are ignored; a suffixed patch such as
    /// `0-rc1` keeps only its leading numeric segment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` when fewer than three dot-separated parts
    /// are present or a numeric component does not parse.
    pub fn parse(input: &str) -> std::result::Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion {
            input: input.to_string(),
        };

        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.len() < 3 {
            return Err(invalid());
        }

        let major = parts[0].parse().map_err(|_| invalid())?;
        let minor = parts[1].parse().map_err(|_| invalid())?;
        let patch = if parts[2] == "GIT" {
            0
        } else {
            let head = parts[2].split('-').next().unwrap_or_default();
            head.parse().map_err(|_| invalid())?
        };

        Ok(Self {
            major,
            minor,
            patch,
        })
    }

    /// Returns whether this version is at least the given bound.
    ///
    /// The bound is compared lexicographically; trailing components may be
    /// omitted and are then unconstrained, so `at_least(&[2])` accepts any
    /// 2.x.y. An empty bound is trivially satisfied.
    #[must_use]
    pub fn at_least(&self, want: &[u32]) -> bool {
        let Some(&major) = want.first() else {
            return true;
        };
        if self.major != major {
            return self.major > major;
        }
        let Some(&minor) = want.get(1) else {
            return true;
        };
        if self.minor != minor {
            return self.minor > minor;
        }
        let Some(&patch) = want.get(2) else {
            return true;
        };
        self.patch >= patch
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Feature gates derived from the probed git version.
///
/// Replaces ad-hoc version checks scattered at call sites: construct once,
/// pass by reference, ask the named question.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    version: GitVersion,
}

impl Capabilities {
    /// Wraps an already-parsed version.
    #[must_use]
    pub const fn new(version: GitVersion) -> Self {
        Self { version }
    }

    /// Parses the first line of `git --version` output.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` when the line does not carry a parsable
    /// version as its third word.
    pub fn detect(version_line: &str) -> std::result::Result<Self, VersionError> {
        let token =
            version_line
                .split_whitespace()
                .nth(2)
                .ok_or_else(|| VersionError::InvalidVersion {
                    input: version_line.to_string(),
                })?;
        let version = GitVersion::parse(token)?;
        debug!(%version, "git version");
        Ok(Self::new(version))
    }

    /// Returns the probed version.
    #[must_use]
    pub const fn version(&self) -> GitVersion {
        self.version
    }

    /// `rev-parse --absolute-git-dir` exists from 2.13.
    #[must_use]
    pub fn supports_absolute_gitdir(&self) -> bool {
        self.version.at_least(&[2, 13])
    }

    /// Oldest git this crate is routinely exercised against.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version.at_least(&[2, 18])
    }
}
