//! Caption template loading.
//!
//! A template is an HTML fragment with two placeholders:
//!
//! - `{title}`: replaced by the image's escaped `title` attribute
//! - `{img}`: replaced by the image element's own markup
//!
//! The stock template ships inside the binary (`resources/legend.html`); a
//! config file can point at a replacement. Either way the template is loaded
//! once, before any file is touched, and handed to the pipeline by reference.
//! Loading never falls back: a configured template that can't be read is an
//! error, not a silent switch to the stock one.

use crate::driver::ErrorKind;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder for the escaped caption text.
pub const TITLE_TOKEN: &str = "{title}";
/// Placeholder for the original image markup.
pub const IMG_TOKEN: &str = "{img}";

const BUNDLED_TEMPLATE: &str = include_str!("../resources/legend.html");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("caption template not found: {path}: {source}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("caption template is empty: {0}")]
    Empty(TemplateSource),
}

impl TemplateError {
    /// Every template failure is fatal and reported as `ResourceMissing`.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ResourceMissing
    }
}

/// Where a template came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Bundled,
    File(PathBuf),
    /// Built in code with [`Template::new`].
    Inline,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Bundled => write!(f, "<bundled legend.html>"),
            TemplateSource::File(path) => write!(f, "{}", path.display()),
            TemplateSource::Inline => write!(f, "<inline template>"),
        }
    }
}

/// An immutable caption template.
#[derive(Debug, Clone)]
pub struct Template {
    text: String,
    source: TemplateSource,
}

impl Template {
    /// Wrap template text directly. Performs no validation.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TemplateSource::Inline,
        }
    }

    fn bundled() -> Self {
        Self {
            text: BUNDLED_TEMPLATE.to_string(),
            source: TemplateSource::Bundled,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }
}

/// Load the caption template: the file at `path` if given, else the bundled one.
pub fn load(path: Option<&Path>) -> Result<Template, TemplateError> {
    let template = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Missing {
                path: path.to_path_buf(),
                source,
            })?;
            Template {
                text,
                source: TemplateSource::File(path.to_path_buf()),
            }
        }
        None => Template::bundled(),
    };

    if template.text.trim().is_empty() {
        return Err(TemplateError::Empty(template.source));
    }
    tracing::debug!(source = %template.source, "loaded caption template");
    Ok(template)
}
