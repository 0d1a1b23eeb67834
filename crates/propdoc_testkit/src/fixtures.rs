//! Test fixtures and file helpers.
//!
//! Provides the canonical sample document used across the test suites
//! and helpers for running a test against a real file on disk.

use propdoc_core::Properties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The canonical sample document.
///
/// Covers a header, a detached blank line, `#` and `!` comments, a
/// multi-line comment block, every short escape, escaped spaces in a
/// key, trailing spaces in a value, the whitespace separator, a
/// continued value with indented continuation lines and a `\u` escape.
pub const SAMPLE: &str = "#comment1\n\
#  comment2\n\
\n\
! comment3\n\
one=simple\n\
two=value containing spaces\n\
# another comment\n\
! and a comment\n\
! block\n\
three=and escapes\\n\\t\\r\\f\n\
\\ with\\ spaces = everywhere  \n\
altsep value\n\
multiline = one \\\n    two  \\\n\tthree\n\
key.4 = \\u1234\n";

/// Cooked keys of [`SAMPLE`] in document order.
pub const SAMPLE_KEYS: [&str; 7] = [
    "one",
    "two",
    "three",
    " with spaces",
    "altsep",
    "multiline",
    "key.4",
];

/// Cooked values of [`SAMPLE`] in document order.
pub const SAMPLE_VALUES: [&str; 7] = [
    "simple",
    "value containing spaces",
    "and escapes\n\t\r\x0c",
    "everywhere  ",
    "value",
    "one two  three",
    "\u{1234}",
];

/// Raw values of [`SAMPLE`] in document order.
pub const SAMPLE_RAW_VALUES: [&str; 7] = [
    "simple",
    "value containing spaces",
    "and escapes\\n\\t\\r\\f",
    "everywhere  ",
    "value",
    "one \\\n    two  \\\n\tthree",
    "\\u1234",
];

/// Parses [`SAMPLE`].
pub fn sample() -> Properties {
    SAMPLE.parse().expect("Sample document should parse")
}

/// A properties file in a temporary directory, removed on drop.
pub struct TestFile {
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestFile {
    /// Creates a file holding `contents`.
    pub fn with_contents(contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.properties");
        fs::write(&path, contents).expect("Failed to write test file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Creates a file holding [`SAMPLE`].
    pub fn sample() -> Self {
        Self::with_contents(SAMPLE)
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file through a `File` reader.
    pub fn load(&self) -> Properties {
        let file = File::open(&self.path).expect("Failed to open test file");
        Properties::load(file).expect("Failed to load test file")
    }

    /// Stores `props` into the file, replacing its contents.
    pub fn store(&self, props: &Properties) {
        let file = File::create(&self.path).expect("Failed to create test file");
        props.store(file).expect("Failed to store test file");
    }

    /// Current contents of the file.
    pub fn contents(&self) -> String {
        fs::read_to_string(&self.path).expect("Failed to read test file")
    }
}

/// Runs a test against a freshly loaded copy of the sample file.
///
/// The store is written back to the file afterwards; the closure's
/// result and the file contents are returned.
///
/// # Example
///
/// ```
/// use propdoc_testkit::with_sample_file;
///
/// let (_, text) = with_sample_file(|props| {
///     props.remove("one");
/// });
/// assert!(!text.contains("one=simple"));
/// ```
pub fn with_sample_file<F, R>(f: F) -> (R, String)
where
    F: FnOnce(&mut Properties) -> R,
{
    let file = TestFile::sample();
    let mut props = file.load();
    let result = f(&mut props);
    file.store(&props);
    (result, file.contents())
}

/// Expected outputs of edits applied to [`SAMPLE`].
pub mod scenarios {
    /// [`super::SAMPLE`] with `one` removed.
    ///
    /// The blank line above `one` stays, now above `two`.
    pub const REMOVE_FIRST: &str = "#comment1\n\
#  comment2\n\
\n\
two=value containing spaces\n\
# another comment\n\
! and a comment\n\
! block\n\
three=and escapes\\n\\t\\r\\f\n\
\\ with\\ spaces = everywhere  \n\
altsep value\n\
multiline = one \\\n    two  \\\n\tthree\n\
key.4 = \\u1234\n";

    /// [`super::SAMPLE`] with `three` removed, comment block included.
    pub const REMOVE_MIDDLE: &str = "#comment1\n\
#  comment2\n\
\n\
! comment3\n\
one=simple\n\
two=value containing spaces\n\
\\ with\\ spaces = everywhere  \n\
altsep value\n\
multiline = one \\\n    two  \\\n\tthree\n\
key.4 = \\u1234\n";

    /// [`super::SAMPLE`] with `key.4` removed.
    pub const REMOVE_LAST: &str = "#comment1\n\
#  comment2\n\
\n\
! comment3\n\
one=simple\n\
two=value containing spaces\n\
# another comment\n\
! and a comment\n\
! block\n\
three=and escapes\\n\\t\\r\\f\n\
\\ with\\ spaces = everywhere  \n\
altsep value\n\
multiline = one \\\n    two  \\\n\tthree\n";

    /// [`super::SAMPLE`] after `clear`.
    pub const CLEARED: &str = "#comment1\n#  comment2\n";

    /// [`super::SAMPLE`] after `clear` and a `put("first", "dummy")`.
    pub const CLEARED_THEN_PUT: &str = "#comment1\n#  comment2\nfirst=dummy\n";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_parses() {
        let props = sample();
        assert_eq!(props.keys().collect::<Vec<_>>(), SAMPLE_KEYS);
        assert_eq!(props.values().collect::<Vec<_>>(), SAMPLE_VALUES);
        assert_eq!(props.raw_values().collect::<Vec<_>>(), SAMPLE_RAW_VALUES);
    }

    #[test]
    fn test_file_roundtrip_is_identity() {
        let file = TestFile::sample();
        let props = file.load();
        file.store(&props);
        assert_eq!(file.contents(), SAMPLE);
    }

    #[test]
    fn test_with_sample_file() {
        let (removed, text) = with_sample_file(|props| props.remove("one"));
        assert_eq!(removed.as_deref(), Some("simple"));
        assert_eq!(text, scenarios::REMOVE_FIRST);
    }
}
