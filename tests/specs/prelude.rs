// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers shared by the specs: a sandboxed home directory and a fluent
//! wrapper around `assert_cmd`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use similar_asserts::assert_eq;

const CLEARED_ENV: &[&str] = &[
    "OCI_CLI_PROFILE",
    "OCI_CLI_CONFIG_FILE",
    "OCISNAP_SETTINGS",
    "OCISNAP_BUCKET",
    "OCISNAP_REGION",
    "RUST_LOG",
];

/// A fake home directory, so nothing under the real `~/.oci` or
/// `~/.config` is read.
pub struct Home {
    dir: TempDir,
}

impl Home {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` at `rel` under the home directory.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn ocisnap(&self) -> Cli {
        let mut cmd = Command::cargo_bin("ocisnap").unwrap();
        cmd.env("HOME", self.path()).env("NO_COLOR", "1");
        for var in CLEARED_ENV {
            cmd.env_remove(var);
        }
        Cli { cmd }
    }
}

/// `ocisnap` in an empty home directory
pub fn cli() -> Cli {
    // The TempDir is dropped here; commands that need files use `Home`.
    Home::empty().ocisnap()
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run::from(output);
        assert_eq!(run.code, Some(0), "expected success\nstderr: {}", run.stderr);
        run
    }

    pub fn exits(mut self, code: i32) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run::from(output);
        assert_eq!(
            run.code,
            Some(code),
            "unexpected exit code\nstdout: {}\nstderr: {}",
            run.stdout,
            run.stderr
        );
        run
    }
}

pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Run {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Run {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn stdout_is_empty(self) -> Self {
        assert_eq!(self.stdout, "");
        self
    }
}
