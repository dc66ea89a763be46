//! Input discovery: which files get captions.
//!
//! Two sources are supported:
//!
//! - a build manifest (`manifest.json`) as written by DocFX-style documentation
//!   builds, filtered to the configured document types
//! - a plain output directory, walked recursively for `*.html` / `*.htm`
//!
//! ## Manifest shape
//!
//! Only the fields used here are modelled; everything else is ignored.
//!
//! ```json
//! {
//!   "files": [
//!     {
//!       "type": "Conceptual",
//!       "source_relative_path": "articles/intro.md",
//!       "output": {
//!         ".html": { "relative_path": "articles/intro.html" }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Output paths are relative to the build's output folder. Only HTML outputs
//! are returned; other outputs of the same item (e.g. `.json` or `.raw.page.json`)
//! are skipped.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub files: Vec<ManifestItem>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestItem {
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub source_relative_path: Option<String>,
    /// Output files keyed by extension (".html", ".json", ...).
    #[serde(default)]
    pub output: BTreeMap<String, OutputFileInfo>,
}

#[derive(Debug, Deserialize)]
pub struct OutputFileInfo {
    pub relative_path: String,
}

impl BuildManifest {
    /// HTML output paths of items whose type is in `document_types`, resolved
    /// against `output_dir`, in manifest order.
    pub fn html_outputs(&self, output_dir: &Path, document_types: &[String]) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|item| document_types.iter().any(|t| *t == item.document_type))
            .flat_map(|item| item.output.values())
            .filter(|out| is_html(Path::new(&out.relative_path)))
            .map(|out| output_dir.join(&out.relative_path))
            .collect()
    }
}

pub fn load_manifest(path: &Path) -> Result<BuildManifest, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// All HTML files under `root`, sorted by path.
pub fn discover_html_files(root: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}
