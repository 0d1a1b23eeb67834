//! Golden test utilities for output verification.
//!
//! Provides helpers for verifying that written documents match
//! expected golden files byte for byte.

use std::fs;
use std::path::{Path, PathBuf};

/// A golden test that compares output against expected files.
pub struct GoldenTest {
    name: String,
    golden_dir: PathBuf,
    update_mode: bool,
}

impl GoldenTest {
    /// Creates a new golden test.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the test (used for file naming)
    /// * `golden_dir` - Directory containing golden files
    pub fn new(name: impl Into<String>, golden_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            golden_dir: golden_dir.as_ref().to_path_buf(),
            update_mode: std::env::var("UPDATE_GOLDEN").is_ok(),
        }
    }

    /// Creates a golden test using the testkit's `golden` directory.
    pub fn with_default_dir(name: impl Into<String>) -> Self {
        Self::new(name, default_golden_dir())
    }

    /// Asserts that the given document text matches the golden file.
    ///
    /// If `UPDATE_GOLDEN` environment variable is set, updates the golden file instead.
    pub fn assert_text(&self, suffix: &str, actual: &str) {
        let path = self.file_path(suffix);

        if self.update_mode {
            self.update_golden_file(&path, actual.as_bytes());
            return;
        }

        if !path.exists() {
            panic!(
                "Golden file not found: {:?}\n\
                 Run with UPDATE_GOLDEN=1 to create it.\n\
                 Actual:\n{}",
                path,
                visible(actual)
            );
        }

        let expected = fs::read_to_string(&path).expect("Failed to read golden file");

        if actual != expected {
            panic!(
                "Golden test '{}' failed for '{}':\n\
                 --- Expected ---\n{}\n\
                 --- Actual ---\n{}\n\
                 Run with UPDATE_GOLDEN=1 to update.",
                self.name,
                suffix,
                visible(&expected),
                visible(actual)
            );
        }
    }

    /// Reads the golden file for `suffix`.
    pub fn read(&self, suffix: &str) -> String {
        fs::read_to_string(self.file_path(suffix)).expect("Failed to read golden file")
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        let filename = if suffix.is_empty() {
            format!("{}.properties", self.name)
        } else {
            format!("{}_{}.properties", self.name, suffix)
        };
        self.golden_dir.join(filename)
    }

    fn update_golden_file(&self, path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create golden directory");
        }
        fs::write(path, data).expect("Failed to write golden file");
        println!("Updated golden file: {:?}", path);
    }
}

/// The `golden` directory next to this crate's manifest.
pub fn default_golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Makes line terminators and trailing whitespace visible in a diff.
///
/// Each line is shown with its terminator spelled out (`\n`, `\r\n`,
/// `\r`) and a `|` before it, so trailing spaces and tabs stand out.
pub fn visible(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
        out.push_str(&rest[..end].replace('\t', "\\t"));
        out.push('|');
        rest = &rest[end..];
        let (shown, len) = if rest.starts_with("\r\n") {
            ("\\r\\n", 2)
        } else if rest.starts_with('\r') {
            ("\\r", 1)
        } else if rest.starts_with('\n') {
            ("\\n", 1)
        } else {
            ("", 0)
        };
        out.push_str(shown);
        out.push('\n');
        rest = &rest[len..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_spells_out_terminators() {
        assert_eq!(visible("a=1  \r\nb=\t2\n"), "a=1  |\\r\\n\nb=\\t2|\\n\n");
        assert_eq!(visible("last"), "last|\n");
        assert_eq!(visible(""), "");
    }

    #[test]
    fn test_file_naming() {
        let golden = GoldenTest::new("sample", "/tmp/golden");
        assert_eq!(
            golden.file_path("edited"),
            PathBuf::from("/tmp/golden/sample_edited.properties")
        );
        assert_eq!(
            golden.file_path(""),
            PathBuf::from("/tmp/golden/sample.properties")
        );
    }
}
