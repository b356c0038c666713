#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tabular_view::RawRecord;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Turns a JSON array literal into a record batch.
pub fn records(value: serde_json::Value) -> Vec<RawRecord> {
    value
        .as_array()
        .expect("array literal")
        .iter()
        .map(|item| item.as_object().cloned().expect("object literal"))
        .collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes `count` generated people as a JSON array.
    pub fn write_people(&self, name: &str, count: usize) -> PathBuf {
        let people: Vec<serde_json::Value> = (1..=count)
            .map(|n| {
                serde_json::json!({
                    "id": n,
                    "name": format!("person{n:03}"),
                    "joined": format!("{:02}/{:02}/20{:02}", n % 28 + 1, n % 12 + 1, n % 30),
                })
            })
            .collect();
        self.write(name, &serde_json::to_string(&people).expect("serialize people"))
    }
}
