//! Shared test utilities for the image-legend test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_page(tmp.path(), "intro.html", r#"<img title="Dusk">"#);
//! process_file(&Html5Engine, &Template::new(FIGURE), &path, options).unwrap();
//! assert_eq!(count(&read(&path), "<figcaption>"), 1);
//! ```

use std::path::{Path, PathBuf};

/// The caption template used throughout the tests.
pub const FIGURE: &str = "<figure>{img}<figcaption>{title}</figcaption></figure>";

/// Wrap body markup in the document shell the serializer produces, so tests
/// can compare whole files.
pub fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head></head><body>{body}</body></html>")
}

/// Write `page(body)` to `dir/name` and return the path.
pub fn write_page(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, page(body)).unwrap();
    path
}

/// Read a file as UTF-8. Panics with the path on failure.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
