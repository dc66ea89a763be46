//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Files
//! 001 articles/intro.html (2 captions)
//! 002 articles/setup.html (no captions)
//!
//! Failures
//! 001 articles/broken.html
//!     IOFailure: IO error: No such file or directory (os error 2)
//!
//! Captioned 2 images in 1 of 3 files (1 failed) in 14 ms
//! ```
//!
//! Paths are shown relative to the run's base directory when possible.
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::driver::RunSummary;
use crate::template::TemplateError;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Format the result of a captioning run.
pub fn format_run_output(summary: &RunSummary, base: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.reports.is_empty() {
        lines.push("Files".to_string());
        for (i, report) in summary.reports.iter().enumerate() {
            let detail = if report.captioned == 0 {
                "no captions".to_string()
            } else {
                plural(report.captioned, "caption", "captions")
            };
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                display_path(&report.path, base),
                detail
            ));
        }
        lines.push(String::new());
    }

    if !summary.failures.is_empty() {
        lines.push("Failures".to_string());
        for (i, failure) in summary.failures.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_path(&failure.path, base)
            ));
            lines.push(format!("{}{}: {}", indent(1), failure.kind(), failure.error));
        }
        lines.push(String::new());
    }

    let total = summary.reports.len() + summary.failures.len();
    let mut footer = format!(
        "Captioned {} in {} of {}",
        plural(summary.captions(), "image", "images"),
        summary.rewritten(),
        plural(total, "file", "files"),
    );
    if !summary.failures.is_empty() {
        footer.push_str(&format!(" ({} failed)", summary.failures.len()));
    }
    footer.push_str(&format!(" in {} ms", summary.elapsed.as_millis()));
    lines.push(footer);

    lines
}

pub fn print_run_output(summary: &RunSummary, base: &Path) {
    for line in format_run_output(summary, base) {
        println!("{}", line);
    }
}

/// Format a fatal template error.
pub fn format_template_error(error: &TemplateError) -> Vec<String> {
    vec![
        format!("{}: {}", error.kind(), error),
        format!("{}No files were modified.", indent(1)),
    ]
}
