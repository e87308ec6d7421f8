//! Integration tests for the CLI application
//!
//! These tests run the compiled binary against real data files.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Helper to create test data files
struct TestDataFiles {
    pub training: NamedTempFile,
    pub test: NamedTempFile,
    pub test_labels: NamedTempFile,
    pub wide_test: NamedTempFile,
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        // Two classes, label in the last column
        let mut training = NamedTempFile::with_suffix(".csv")?;
        writeln!(training, "2.0,1.0,1")?;
        writeln!(training, "-2.0,-1.0,0")?;
        writeln!(training, "1.5,0.8,1")?;
        writeln!(training, "-1.5,-0.8,0")?;
        writeln!(training, "1.8,0.9,1")?;
        writeln!(training, "-1.8,-0.9,0")?;
        training.flush()?;

        let mut test = NamedTempFile::with_suffix(".csv")?;
        writeln!(test, "1.6,0.7")?;
        writeln!(test, "-1.6,-0.7")?;
        test.flush()?;

        let mut test_labels = NamedTempFile::with_suffix(".csv")?;
        writeln!(test_labels, "1")?;
        writeln!(test_labels, "0")?;
        test_labels.flush()?;

        let mut wide_test = NamedTempFile::with_suffix(".csv")?;
        writeln!(wide_test, "1.0,2.0,3.0")?;
        wide_test.flush()?;

        Ok(TestDataFiles {
            training,
            test,
            test_labels,
            wide_test,
        })
    }
}

fn linsvm<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_linsvm"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to run CLI binary")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help() {
    let output = linsvm(["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--training", "--lambda", "--optimizer", "--test-labels", "--score"] {
        assert!(stdout.contains(flag), "help should mention {flag}");
    }
}

#[test]
fn test_cli_train_then_predict() {
    let files = TestDataFiles::new().unwrap();
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("model.json");
    let predictions = dir.path().join("predictions.csv");

    let output = linsvm([
        "-t".to_string(),
        path_arg(files.training.path()),
        "-L".to_string(),
        "0.1".to_string(),
        "-M".to_string(),
        path_arg(&model),
    ]);
    assert!(output.status.success(), "training failed: {}", stderr(&output));
    assert!(model.exists());

    let output = linsvm([
        "-m".to_string(),
        path_arg(&model),
        "-T".to_string(),
        path_arg(files.test.path()),
        "-A".to_string(),
        path_arg(files.test_labels.path()),
        "-P".to_string(),
        path_arg(&predictions),
    ]);
    assert!(output.status.success(), "prediction failed: {}", stderr(&output));

    let written = std::fs::read_to_string(&predictions).unwrap();
    assert_eq!(written, "1\n0\n");
    assert!(stderr(&output).contains("Total accuracy for all points is 1"));
}

#[test]
fn test_cli_warns_when_nothing_is_saved() {
    let files = TestDataFiles::new().unwrap();
    let output = linsvm(["-t".to_string(), path_arg(files.training.path())]);

    assert!(output.status.success());
    assert!(stderr(&output).contains("no output will be saved"));
}

#[test]
fn test_cli_rejects_negative_lambda() {
    let files = TestDataFiles::new().unwrap();
    let output = linsvm([
        "-t".to_string(),
        path_arg(files.training.path()),
        "-L".to_string(),
        "-1".to_string(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("lambda"));
}

#[test]
fn test_cli_rejects_unknown_optimizer() {
    let files = TestDataFiles::new().unwrap();
    let output = linsvm([
        "-t".to_string(),
        path_arg(files.training.path()),
        "-O".to_string(),
        "foo".to_string(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("foo"));
}

#[test]
fn test_cli_requires_training_or_model() {
    let files = TestDataFiles::new().unwrap();
    let output = linsvm(["-T".to_string(), path_arg(files.test.path())]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_dimensionality_mismatch() {
    let files = TestDataFiles::new().unwrap();
    let output = linsvm([
        "-t".to_string(),
        path_arg(files.training.path()),
        "-T".to_string(),
        path_arg(files.wide_test.path()),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("(3)") && err.contains("(2)"), "{err}");
}

#[test]
fn test_cli_psgd_with_scores() {
    let files = TestDataFiles::new().unwrap();
    let dir = TempDir::new().unwrap();
    let scores = dir.path().join("scores.csv");

    let output = linsvm([
        "-t".to_string(),
        path_arg(files.training.path()),
        "-O".to_string(),
        "psgd".to_string(),
        "-s".to_string(),
        "0.05".to_string(),
        "-T".to_string(),
        path_arg(files.test.path()),
        "-p".to_string(),
        path_arg(&scores),
    ]);
    assert!(output.status.success(), "psgd run failed: {}", stderr(&output));

    let written = std::fs::read_to_string(&scores).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.split(',').count() == 2));
}
