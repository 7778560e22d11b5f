//! Common test utilities and helpers
//!
//! Shared utilities for integration tests: a temporary root directory
//! and a runner for the stackforge binary.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use assert_fs::TempDir;

/// Temporary root directory for one orchestration run under test
pub struct TestRoot {
    /// Temporary directory standing in for --root-dir
    pub dir: TempDir,
}

impl TestRoot {
    /// Create a fresh, empty root
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path of the root directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file under the root, with parents
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check whether a path exists under the root
    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the stackforge binary with `--root-dir` pointed at the test root
pub fn stackforge(root: &TestRoot, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stackforge"));
    cmd.current_dir(root.path());
    cmd.arg("--root-dir");
    cmd.arg(root.path());
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute stackforge")
}

/// Run the stackforge binary without injecting --root-dir
pub fn stackforge_raw(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stackforge"));
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute stackforge")
}

/// Stdout of a finished run as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished run as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// The dry-run command lines in stdout, in order
pub fn dry_run_lines(output: &Output) -> Vec<String> {
    stdout(output)
        .lines()
        .filter(|line| line.starts_with("[dry-run] "))
        .map(ToString::to_string)
        .collect()
}
