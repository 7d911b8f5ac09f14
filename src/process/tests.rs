// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::io::split_stdout;
use super::spec::{JobSpec, find_executable};
use crate::utility::encoding::encoding_for_label;

#[test]
fn test_split_stdout_trailing_newline() {
    let lines = split_stdout(b"a\nb\nc\n", None);
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[test]
fn test_split_stdout_no_trailing_newline() {
    let lines = split_stdout(b"a\nb\nc", None);
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[test]
fn test_split_stdout_interior_empty_lines() {
    let lines = split_stdout(b"a\n\nb\n", None);
    assert_eq!(lines, vec!["a", "", "b"]);
}

#[test]
fn test_split_stdout_empty() {
    let lines = split_stdout(b"", None);
    assert!(lines.is_empty(), "no output should produce no lines");
}

#[test]
fn test_split_stdout_lone_newline() {
    let lines = split_stdout(b"\n", None);
    assert_eq!(lines, vec![""]);
}

#[test]
fn test_split_stdout_preserves_carriage_returns() {
    let lines = split_stdout(b"a\r\nb\r\n", None);
    assert_eq!(lines, vec!["a\r", "b\r"]);
}

#[test]
fn test_split_stdout_decodes_latin1() {
    let enc = encoding_for_label("latin1").expect("latin1 should resolve");
    let lines = split_stdout(b"caf\xe9\n", Some(enc));
    assert_eq!(lines, vec!["café"]);
}

#[test]
fn test_command_line_quotes_spaced_args() {
    let spec = JobSpec::new("git")
        .arg("commit")
        .arg("-m")
        .arg("two words");
    insta::assert_snapshot!(spec.command_line(), @r#"git commit -m "two words""#);
}

#[test]
fn test_executable_lookup_found() {
    // cargo should always be available since we're running tests with cargo
    let path = find_executable("cargo").expect("cargo should be found in PATH");
    assert!(path.exists(), "returned path should exist");

    // Second lookup hits the cache and must agree
    let cached = find_executable("cargo").expect("cached lookup should succeed");
    assert_eq!(path, cached);
}

#[test]
fn test_executable_lookup_not_found() {
    let err = find_executable("nonexistent_program_12345")
        .expect_err("nonexistent program should not be found");
    let msg = format!("{err}");
    assert!(
        msg.contains("nonexistent_program_12345"),
        "error should mention the program: {msg}"
    );
}

#[tokio::test]
async fn test_run_missing_executable() {
    let result = JobSpec::new("nonexistent_program_12345").run().await;
    assert!(result.is_err(), "run should fail for a missing executable");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_captures_lines() {
    let output = JobSpec::new("printf")
        .arg("a\\nb\\nc\\n")
        .run()
        .await
        .expect("printf should succeed");

    assert!(output.success());
    assert_eq!(output.lines(), ["a", "b", "c"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_without_trailing_newline() {
    let output = JobSpec::new("printf")
        .arg("a\\nb\\nc")
        .run()
        .await
        .expect("printf should succeed");

    assert_eq!(output.lines(), ["a", "b", "c"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_empty_stdout() {
    let output = JobSpec::new("true").run().await.expect("true should succeed");

    assert!(output.success());
    assert!(output.lines().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_feeds_stdin() {
    let output = JobSpec::new("cat")
        .input_lines(vec!["alpha".to_string(), "beta".to_string()])
        .run()
        .await
        .expect("cat should succeed");

    assert_eq!(output.lines(), ["alpha", "beta"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_exit_code_and_stderr() {
    let output = JobSpec::new("sh")
        .args(["-c", "echo out; echo err >&2; exit 3"])
        .suppress_stderr()
        .run()
        .await
        .expect("process should complete");

    assert!(!output.success());
    assert_eq!(output.exit_code(), 3);
    assert_eq!(output.lines(), ["out"]);
    assert_eq!(output.stderr().trim_end(), "err");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_in_working_directory() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let expected = dir
        .path()
        .canonicalize()
        .expect("tempdir should canonicalize");

    let output = JobSpec::new("pwd")
        .cwd(dir.path())
        .run()
        .await
        .expect("pwd should succeed");

    assert_eq!(output.lines(), [expected.display().to_string()]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_decodes_declared_encoding() {
    let output = JobSpec::new("printf")
        .arg("caf\\351\\n")
        .encoding("latin1")
        .run()
        .await
        .expect("printf should succeed");

    assert_eq!(output.lines(), ["café"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_tolerates_early_stdin_close() {
    // `true` exits without reading stdin; feeding it must not error.
    let output = JobSpec::new("true")
        .input_lines(vec!["ignored".to_string(); 64])
        .run()
        .await
        .expect("process should complete despite unread stdin");

    assert!(output.success());
}
