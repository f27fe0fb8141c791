//! Shared test infrastructure for CLI tests.
// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch working directory the binary runs in.
pub struct Workspace {
    dir: TempDir,
}

/// Exit code plus captured streams from one `acpw` run.
#[derive(Debug)]
pub struct RunResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
    }

    pub fn read_json(&self, rel: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(rel)).expect("parse JSON")
    }

    /// Run `acpw` with `args` from the workspace root.
    pub fn run(&self, args: &[&str]) -> RunResult {
        Command::new(env!("CARGO_BIN_EXE_acpw"))
            .args(args)
            .current_dir(self.root())
            .env_remove("ACPW_LOG")
            .env_remove("ACPW_SEARCH_ROOTS")
            .output()
            .expect("run acpw")
            .into()
    }
}

/// Single-test plan clicking `target`.
pub fn plan_json(suite: &str, source_path: &str, target: &str) -> String {
    serde_json::json!({
        "suiteName": suite,
        "source": { "repo": "web", "path": source_path },
        "tests": [{
            "name": format!("{suite} works"),
            "startUrl": "/",
            "steps": [
                { "action": "click", "target": target },
                { "action": "expectVisible", "target": target }
            ]
        }]
    })
    .to_string()
}
