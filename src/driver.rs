//! File driver: read, caption, write back.
//!
//! For each file:
//!
//! ```text
//! read bytes → parse → select → synthesize → splice (per image) → serialize → write
//! ```
//!
//! Files are independent. They are processed in parallel with rayon, and a
//! failure on one file is recorded in the [`RunSummary`] without stopping the
//! others. The template is only read, so one instance is shared by every worker.
//!
//! ## Write safety
//!
//! A file is only written once its new content is fully built. The content goes
//! to a temporary file in the same directory which is then renamed over the
//! original, so a failed run never leaves a half-written page behind. Files in
//! which nothing was captioned are not rewritten at all.

use crate::caption::synthesize;
use crate::config::LegendConfig;
use crate::dom::Document;
use crate::html::{HtmlEngine, ParseError};
use crate::select::select;
use crate::splice::{SpliceError, splice};
use crate::template::Template;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Coarse failure classes reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceMissing,
    ParseFailure,
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ResourceMissing => "ResourceMissing",
            ErrorKind::ParseFailure => "ParseFailure",
            ErrorKind::IoFailure => "IOFailure",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Splice error: {0}")]
    Splice(#[from] SpliceError),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::Io(_) => ErrorKind::IoFailure,
            ProcessError::Parse(_) | ProcessError::Splice(_) => ErrorKind::ParseFailure,
        }
    }
}

/// Knobs for a captioning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionOptions {
    /// Stamp each caption root with the caption marker.
    pub mark_captions: bool,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            mark_captions: true,
        }
    }
}

impl From<&LegendConfig> for CaptionOptions {
    fn from(config: &LegendConfig) -> Self {
        Self {
            mark_captions: config.mark_captions,
        }
    }
}

/// What one pass over a document did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Images returned by the selector.
    pub candidates: usize,
    /// Images replaced by a caption.
    pub captioned: usize,
}

/// Caption every eligible image of `doc`, in document order.
pub fn caption_document(
    engine: &impl HtmlEngine,
    template: &Template,
    doc: &mut Document,
    options: CaptionOptions,
) -> Result<DocumentStats, ProcessError> {
    let images = select(doc);
    let mut stats = DocumentStats {
        candidates: images.len(),
        captioned: 0,
    };
    for image in images {
        let Some(mut fragment) = synthesize(engine, template, doc, image)? else {
            continue;
        };
        if options.mark_captions {
            fragment.mark();
        }
        splice(doc, image, &fragment)?;
        tracing::debug!(caption = %fragment.to_html(), "captioned image");
        stats.captioned += 1;
    }
    Ok(stats)
}

/// Result of a successfully processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub candidates: usize,
    pub captioned: usize,
    /// False when nothing changed and the file was left as it was.
    pub rewritten: bool,
}

/// A file that could not be processed. The file on disk is unchanged.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ProcessError,
}

impl FileFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Caption one file in place.
#[tracing::instrument(skip(engine, template, options))]
pub fn process_file(
    engine: &impl HtmlEngine,
    template: &Template,
    path: &Path,
    options: CaptionOptions,
) -> Result<FileReport, ProcessError> {
    let bytes = fs::read(path)?;
    let mut doc = engine.parse_bytes(&bytes)?;
    let stats = caption_document(engine, template, &mut doc, options)?;

    let rewritten = stats.captioned > 0;
    if rewritten {
        write_atomic(path, engine.serialize(&doc).as_bytes())?;
        tracing::info!(captioned = stats.captioned, "rewrote file");
    } else {
        tracing::debug!(candidates = stats.candidates, "nothing to caption");
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        candidates: stats.candidates,
        captioned: stats.captioned,
        rewritten,
    })
}

/// Replace `path` with `contents` via a sibling temp file and a rename.
///
/// The original file's permissions are carried over.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Outcome of a run over many files.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Successful files, in input order.
    pub reports: Vec<FileReport>,
    /// Failed files, in input order.
    pub failures: Vec<FileFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn captions(&self) -> usize {
        self.reports.iter().map(|r| r.captioned).sum()
    }

    pub fn rewritten(&self) -> usize {
        self.reports.iter().filter(|r| r.rewritten).count()
    }

    /// True when there was work to do and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.reports.is_empty() && !self.failures.is_empty()
    }
}

/// Caption every file in `paths`, in parallel.
pub fn process_files(
    engine: &impl HtmlEngine,
    template: &Template,
    paths: &[PathBuf],
    options: CaptionOptions,
) -> RunSummary {
    let start = Instant::now();
    let outcomes: Vec<Result<FileReport, FileFailure>> = paths
        .par_iter()
        .map(|path| {
            process_file(engine, template, path, options).map_err(|error| {
                tracing::warn!(path = %path.display(), kind = %error.kind(), %error, "file failed");
                FileFailure {
                    path: path.clone(),
                    error,
                }
            })
        })
        .collect();

    let mut summary = RunSummary::default();
    for outcome in outcomes {
        match outcome {
            Ok(report) => summary.reports.push(report),
            Err(failure) => summary.failures.push(failure),
        }
    }
    summary.elapsed = start.elapsed();
    summary
}
