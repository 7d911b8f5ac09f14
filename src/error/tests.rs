// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{GitError, PlumbError, ProcessError, Result, VersionError};

#[test]
fn test_version_error_display() {
    let err = VersionError::InvalidVersion {
        input: "2.banana".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"invalid version string: '2.banana'");
}

#[test]
fn test_git_error_display() {
    let err = GitError::CommandFailed {
        command: "apply".to_string(),
        message: "corrupt patch at line 3".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"git command failed: apply - corrupt patch at line 3");
}

#[test]
fn test_process_error_display() {
    let err = ProcessError::ExecutableNotFound {
        name: "git".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"executable not found: 'git' (not in PATH)");
}

#[test]
fn test_boxing_from_impls() {
    let err: PlumbError = GitError::NotARepository {
        path: "/tmp/nowhere".to_string(),
    }
    .into();
    assert!(matches!(err, PlumbError::Git(_)));

    let err: PlumbError = std::io::Error::other("boom").into();
    assert!(matches!(err, PlumbError::Io(_)));
}

#[test]
fn test_plumb_error_size() {
    // Box<str> variants are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<PlumbError>();
    assert!(size <= 24, "PlumbError is {size} bytes, expected <= 24");
}

#[test]
fn test_result_size() {
    let size = std::mem::size_of::<Result<()>>();
    assert!(size <= 24, "Result<()> is {size} bytes, expected <= 24");
}
