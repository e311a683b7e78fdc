// Integration test utilities and common code
// Shared corpus fixtures for the scanner integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Weight table used across the integration tests
pub const HELLO_WEIGHTS: &str = "he\t10\nel\t5\nll\t3\nlo\t2\n";

/// Temporary corpus directory plus a weight table stored beside it
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
    pub weights_path: PathBuf,
}

impl TestFixture {
    /// Create a fixture whose corpus lives in `corpus/` and whose weight
    /// table lives outside it, so the table is never scanned
    pub fn new() -> Self {
        Self::with_weights(HELLO_WEIGHTS)
    }

    pub fn with_weights(weights: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().join("corpus");
        fs::create_dir_all(&root_path).expect("Failed to create corpus directory");

        let weights_path = temp_dir.path().join("bigrams.tsv");
        fs::write(&weights_path, weights).expect("Failed to write weight table");

        Self {
            temp_dir,
            root_path,
            weights_path,
        }
    }

    /// Create a corpus text file with given content
    pub fn create_text_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_raw_file(relative_path, content.as_bytes())
    }

    /// Create a corpus file with arbitrary bytes
    pub fn create_raw_file<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Path inside the temp dir but outside the corpus
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Data rows of a TSV result table, banners and headers removed
pub fn result_rows(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with("===") && !line.starts_with("transform\t"))
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
