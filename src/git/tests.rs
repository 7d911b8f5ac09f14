// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::blame::{BlameInfo, parse_blame};
use super::context::{ContextOptions, DiffAlgorithm};
use super::file::{benign_ls_files_stderr, parse_ls_files};
use super::patch::{Hunk, HunkKind, HunkRange, create_patch, parse_diff_line};
use super::version::{Capabilities, GitVersion};

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(ToString::to_string).collect()
}

// --- version ---

#[test]
fn test_version_parse_release() {
    let version = GitVersion::parse("2.30.1").expect("should parse");
    assert_eq!(
        version,
        GitVersion {
            major: 2,
            minor: 30,
            patch: 1
        }
    );
}

#[test]
fn test_version_parse_development_marker() {
    let version = GitVersion::parse("2.20.GIT").expect("should parse");
    assert_eq!(
        version,
        GitVersion {
            major: 2,
            minor: 20,
            patch: 0
        }
    );
}

#[test]
fn test_version_parse_suffixed_patch() {
    // Release candidates carry a suffix on the patch component
    let version = GitVersion::parse("2.43.0-rc1").expect("should parse");
    assert_eq!(version.patch, 0);

    // Components beyond the third are ignored
    let version = GitVersion::parse("2.43.0.rc1").expect("should parse");
    assert_eq!(version.patch, 0);
}

#[test]
fn test_version_parse_rejects_malformed() {
    for input in ["2.43", "x.1.2", "2.x.3", "1.2.beta", ""] {
        assert!(
            GitVersion::parse(input).is_err(),
            "'{input}' should not parse"
        );
    }
}

#[test]
fn test_version_at_least_is_lexicographic() {
    let version = GitVersion {
        major: 2,
        minor: 30,
        patch: 1,
    };

    assert!(version.at_least(&[]));
    assert!(version.at_least(&[2]));
    assert!(version.at_least(&[2, 13]));
    assert!(version.at_least(&[2, 30, 1]));
    assert!(version.at_least(&[1, 99, 99]));

    assert!(!version.at_least(&[2, 30, 2]));
    assert!(!version.at_least(&[2, 31]));
    assert!(!version.at_least(&[3]));
}

#[test]
fn test_version_at_least_ignores_unbounded_components() {
    let version = GitVersion {
        major: 2,
        minor: 1,
        patch: 0,
    };
    assert!(version.at_least(&[2]));

    // A higher major satisfies any minor bound
    let version = GitVersion {
        major: 3,
        minor: 0,
        patch: 0,
    };
    assert!(version.at_least(&[2, 99]));

    // A lower major fails regardless of minor
    let version = GitVersion {
        major: 1,
        minor: 99,
        patch: 0,
    };
    assert!(!version.at_least(&[2]));
}

#[test]
fn test_capabilities_detect() {
    let caps = Capabilities::detect("git version 2.43.0").expect("should detect");
    assert!(caps.supports_absolute_gitdir());
    assert!(caps.is_supported());

    let caps = Capabilities::detect("git version 2.12.5").expect("should detect");
    assert!(!caps.supports_absolute_gitdir());
    assert!(!caps.is_supported());

    let caps = Capabilities::detect("git version 2.17.1").expect("should detect");
    assert!(caps.supports_absolute_gitdir());
    assert!(!caps.is_supported());
}

#[test]
fn test_capabilities_detect_rejects_garbage() {
    assert!(Capabilities::detect("").is_err());
    assert!(Capabilities::detect("git version").is_err());
    assert!(Capabilities::detect("not a version line at all").is_err());
}

// --- patch ---

fn change_hunk() -> Hunk {
    Hunk {
        removed: HunkRange {
            start: 3,
            count: 1,
            lines: owned(&["old line"]),
        },
        added: HunkRange {
            start: 3,
            count: 1,
            lines: owned(&["new line"]),
        },
    }
}

fn add_hunk() -> Hunk {
    Hunk {
        removed: HunkRange {
            start: 5,
            count: 0,
            lines: Vec::new(),
        },
        added: HunkRange {
            start: 6,
            count: 2,
            lines: owned(&["a", "b"]),
        },
    }
}

#[test]
fn test_hunk_kind_derivation() {
    assert_eq!(change_hunk().kind(), HunkKind::Change);
    assert_eq!(add_hunk().kind(), HunkKind::Add);

    let delete = Hunk {
        removed: HunkRange {
            start: 7,
            count: 2,
            lines: owned(&["l1", "l2"]),
        },
        added: HunkRange {
            start: 6,
            count: 0,
            lines: Vec::new(),
        },
    };
    assert_eq!(delete.kind(), HunkKind::Delete);

    // An empty post-image wins over an empty pre-image
    assert_eq!(Hunk::default().kind(), HunkKind::Delete);
}

#[test]
fn test_create_patch_change() {
    let patch = create_patch("src/main.rs", &[change_hunk()], "100644", false);
    assert_eq!(
        patch,
        owned(&[
            "diff --git a/src/main.rs b/src/main.rs",
            "index 000000..000000 100644",
            "--- a/src/main.rs",
            "+++ b/src/main.rs",
            "@@ -3,1 +3,1 @@",
            "-old line",
            "+new line",
        ])
    );
}

#[test]
fn test_create_patch_add_starts_after_old_line() {
    let patch = create_patch("f", &[add_hunk()], "100644", false);
    assert_eq!(
        patch,
        owned(&[
            "diff --git a/f b/f",
            "index 000000..000000 100644",
            "--- a/f",
            "+++ b/f",
            "@@ -6,0 +6,2 @@",
            "+a",
            "+b",
        ])
    );
}

#[test]
fn test_create_patch_accumulates_offsets() {
    let second = Hunk {
        removed: HunkRange {
            start: 10,
            count: 1,
            lines: owned(&["x"]),
        },
        added: HunkRange {
            start: 12,
            count: 1,
            lines: owned(&["y"]),
        },
    };
    let patch = create_patch("f", &[add_hunk(), second], "100644", false);

    // The add grew the file by two lines, shifting the second hunk's
    // post-image start
    assert_eq!(
        &patch[4..],
        owned(&[
            "@@ -6,0 +6,2 @@",
            "+a",
            "+b",
            "@@ -10,1 +12,1 @@",
            "-x",
            "+y",
        ])
    );
}

#[test]
fn test_create_patch_invert_swaps_sides() {
    let patch = create_patch("f", &[change_hunk()], "100644", true);
    assert_eq!(
        &patch[4..],
        owned(&["@@ -3,1 +3,1 @@", "-new line", "+old line"])
    );

    let patch = create_patch("f", &[add_hunk()], "100644", true);
    assert_eq!(&patch[4..], owned(&["@@ -6,2 +6,0 @@", "-a", "-b"]));
}

#[test]
fn test_parse_diff_line_with_counts() {
    let hunk = parse_diff_line("@@ -5,3 +7,2 @@ fn main()")
        .expect("pattern should compile")
        .expect("should match");
    assert_eq!(hunk.removed.start, 5);
    assert_eq!(hunk.removed.count, 3);
    assert_eq!(hunk.added.start, 7);
    assert_eq!(hunk.added.count, 2);
    assert!(hunk.removed.lines.is_empty());
    assert!(hunk.added.lines.is_empty());
}

#[test]
fn test_parse_diff_line_defaults_missing_counts() {
    let hunk = parse_diff_line("@@ -5 +7 @@")
        .expect("pattern should compile")
        .expect("should match");
    assert_eq!(hunk.removed.count, 1);
    assert_eq!(hunk.added.count, 1);
}

#[test]
fn test_parse_diff_line_rejects_non_headers() {
    for line in ["context", "-removed", "+added", "@@ malformed @@"] {
        let parsed = parse_diff_line(line).expect("pattern should compile");
        assert!(parsed.is_none(), "'{line}' should not parse as a header");
    }
}

// --- blame ---

#[test]
fn test_parse_blame_porcelain() {
    let lines = owned(&[
        "abc123ef9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a 4 10",
        "author Jane",
        "author-mail <j@x.com>",
        "author-time 1700000000",
        "author-tz +0100",
        "committer Bob",
        "committer-mail <b@x.com>",
        "committer-time 1700000001",
        "committer-tz +0000",
        "summary Fix the thing",
        "previous deadbeef old/name.rs",
        "filename new/name.rs",
        "boundary",
        "never-heard-of-it some value",
        "\tthe blamed content line",
    ]);

    let info = parse_blame(&lines).expect("should parse");

    assert_eq!(info.sha, "abc123ef9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a");
    assert_eq!(info.abbrev_sha, "abc123ef");
    assert_eq!(info.orig_lnum, 4);
    assert_eq!(info.final_lnum, 10);
    assert_eq!(info.author, "Jane");
    assert_eq!(info.author_mail, "<j@x.com>");
    assert_eq!(info.author_time, 1_700_000_000);
    assert_eq!(info.author_tz.as_deref(), Some("+0100"));
    assert_eq!(info.committer, "Bob");
    assert_eq!(info.committer_mail, "<b@x.com>");
    assert_eq!(info.committer_time, 1_700_000_001);
    assert_eq!(info.committer_tz.as_deref(), Some("+0000"));
    assert_eq!(info.summary, "Fix the thing");
    assert_eq!(info.previous_sha.as_deref(), Some("deadbeef"));
    assert_eq!(info.previous_filename.as_deref(), Some("old/name.rs"));
    assert_eq!(info.filename.as_deref(), Some("new/name.rs"));
}

#[test]
fn test_parse_blame_unparsable_header_numbers_become_zero() {
    let info = parse_blame(&owned(&["deadbeef x y"])).expect("should parse");
    assert_eq!(info.sha, "deadbeef");
    assert_eq!(info.orig_lnum, 0);
    assert_eq!(info.final_lnum, 0);
}

#[test]
fn test_parse_blame_empty_output() {
    assert!(parse_blame(&[]).is_none());
}

#[test]
fn test_blame_not_committed_record() {
    let info = BlameInfo::not_committed(7);
    assert_eq!(info.sha, "0".repeat(40));
    assert_eq!(info.abbrev_sha, "00000000");
    assert_eq!(info.orig_lnum, 0);
    assert_eq!(info.final_lnum, 7);
    assert_eq!(info.author, "Not Committed Yet");
    assert_eq!(info.author_mail, "<not.committed.yet>");
    assert_eq!(info.committer, "Not Committed Yet");
    assert_eq!(info.committer_mail, "<not.committed.yet>");
    assert!(info.author_time > 0);
    assert_eq!(info.author_time, info.committer_time);
    assert_eq!(info.author_tz, None);
    assert_eq!(info.summary, "");
    assert_eq!(info.previous_sha, None);
    assert_eq!(info.filename, None);
}

// --- file info parsing ---

#[test]
fn test_parse_ls_files_tracked() {
    let props = parse_ls_files(&owned(&[
        "100644 abc123 0\ti/lf w/lf attr/text=auto\tsrc/lib.rs",
    ]));
    assert_eq!(props.mode_bits.as_deref(), Some("100644"));
    assert_eq!(props.object_name.as_deref(), Some("abc123"));
    assert_eq!(props.relpath.as_deref(), Some("src/lib.rs"));
    assert!(!props.has_conflicts);
    assert!(!props.i_crlf);
    assert!(!props.w_crlf);
}

#[test]
fn test_parse_ls_files_eol_flags() {
    let props = parse_ls_files(&owned(&["100644 abc 0\ti/crlf w/crlf attr/\tf.txt"]));
    assert!(props.i_crlf);
    assert!(props.w_crlf);

    // Checked-out CRLF with an LF index means git converts on the way in
    let props = parse_ls_files(&owned(&["100644 abc 0\ti/lf w/crlf attr/\tf.txt"]));
    assert!(!props.i_crlf);
    assert!(props.w_crlf);
}

#[test]
fn test_parse_ls_files_untracked() {
    let props = parse_ls_files(&owned(&["i/      w/lf    attr/                 \tnew.txt"]));
    assert_eq!(props.relpath.as_deref(), Some("new.txt"));
    assert_eq!(props.object_name, None);
    assert_eq!(props.mode_bits, None);
    assert!(!props.has_conflicts);
}

#[test]
fn test_parse_ls_files_conflict_keeps_stage1_ancestor() {
    let props = parse_ls_files(&owned(&[
        "100644 ancestor111 1\ti/lf w/lf attr/\tfile.txt",
        "100644 ours222 2\ti/lf w/lf attr/\tfile.txt",
        "100644 theirs333 3\ti/lf w/lf attr/\tfile.txt",
    ]));
    assert!(props.has_conflicts);
    assert_eq!(props.object_name.as_deref(), Some("ancestor111"));
    assert_eq!(props.mode_bits.as_deref(), Some("100644"));
}

#[test]
fn test_parse_ls_files_both_added_conflict_has_no_ancestor() {
    let props = parse_ls_files(&owned(&[
        "100644 ours222 2\ti/lf w/lf attr/\tfile.txt",
        "100644 theirs333 3\ti/lf w/lf attr/\tfile.txt",
    ]));
    assert!(props.has_conflicts);
    assert_eq!(props.object_name, None);
    assert_eq!(props.mode_bits, None);
}

#[test]
fn test_benign_ls_files_stderr() {
    let benign = "warning: could not open directory 'sub/dir/': No such file or directory";
    assert!(benign_ls_files_stderr(benign).expect("pattern should compile"));

    let fatal = "fatal: not a git repository";
    assert!(!benign_ls_files_stderr(fatal).expect("pattern should compile"));
}

// --- context options ---

#[test]
fn test_context_options_defaults() {
    let options = ContextOptions::default();
    insta::assert_snapshot!(options.git_cmd(), @"git");
    assert_eq!(options.fallback_tool(), None);
    assert!(options.worktrees().is_empty());
}

#[test]
fn test_context_options_builder() {
    let options = ContextOptions::builder()
        .with_git_cmd("/usr/local/bin/git".to_string())
        .with_fallback_tool("yadm".to_string())
        .build();
    assert_eq!(options.git_cmd(), "/usr/local/bin/git");
    assert_eq!(options.fallback_tool(), Some("yadm"));
}

#[test]
fn test_diff_algorithm_command_line_names() {
    assert_eq!(DiffAlgorithm::default(), DiffAlgorithm::Myers);
    assert_eq!(DiffAlgorithm::Myers.as_str(), "myers");
    assert_eq!(DiffAlgorithm::Minimal.as_str(), "minimal");
    assert_eq!(DiffAlgorithm::Patience.as_str(), "patience");
    assert_eq!(DiffAlgorithm::Histogram.as_str(), "histogram");
}
