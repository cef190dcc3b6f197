//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Schema for announcement banners used throughout the tests
pub const BANNER_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "type": "object",
  "required": ["title"],
  "properties": {
    "title": { "type": "string", "minLength": 1 },
    "summary": { "type": "string" },
    "details": { "type": "string" },
    "start": { "type": ["string", "null"], "format": "date-time" },
    "end": { "type": ["string", "null"], "format": "date-time" }
  }
}"#;

pub const VALID_BANNER: &str = r#"title: Scheduled maintenance
summary: The portal will be read-only for an hour
details: '<p>See the <a href="https://status.example.com">status page</a> for <b>updates</b>.</p>'
start: 2024-03-01T08:00:00Z
end: 2024-03-01T09:00:00Z
"#;

/// A temporary workspace holding a `data/` folder and a schema next to it
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("schema.json"), BANNER_SCHEMA).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.path().join("schema.json")
    }

    /// Write a file relative to `data/`, creating parent directories
    pub fn write_data(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.data_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write a file relative to the workspace root
    pub fn write_root(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Run the binary on `data/` and `schema.json` with extra arguments
    /// placed before the positionals
    pub fn run(&self, extra_args: &[&str]) -> Output {
        let data_dir = self.data_dir();
        let schema = self.schema_path();
        let mut args: Vec<&str> = extra_args.to_vec();
        args.push(data_dir.to_str().unwrap());
        args.push(schema.to_str().unwrap());
        self.run_raw(&args)
    }

    /// Run the binary with exactly `args`, from inside the workspace
    pub fn run_raw(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_validate-yaml"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute validate-yaml")
    }
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
