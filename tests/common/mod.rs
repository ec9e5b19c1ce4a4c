//! Shared scratch-directory harness for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create scratch dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `rel` (relative to the scratch root), creating
    /// any parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let full = self.dir.path().join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&full, contents).expect("write scratch file");
        full
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let full = self.dir.path().join(rel);
        fs::create_dir_all(&full).expect("create scratch dir");
        full
    }

    pub fn config_with_extensions(&self, extensions: &[&str]) -> ngrip::config::ConfigFile {
        ngrip::config::ConfigFile {
            editor_template: "vim +{line} '+/{pattern}{case}' {file}".to_string(),
            extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            specifics: std::collections::HashSet::new(),
        }
    }
}
