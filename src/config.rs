//! Configuration module.
//!
//! Handles loading, validating, and merging `image-legend.toml`. Every key is
//! optional: stock defaults are serialized to a TOML table and the user file is
//! merged on top, so a config only needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # template = "templates/legend.html"  # Caption template (relative to this file)
//! document_types = ["Conceptual"]       # Manifest item types to process
//! mark_captions = true                  # Stamp captions so re-runs skip them
//!
//! [processing]
//! # max_processes = 4                   # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "image-legend.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `image-legend.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegendConfig {
    /// Caption template file. `None` uses the bundled template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Manifest item types whose HTML outputs get captions.
    pub document_types: Vec<String>,
    /// Stamp spliced captions with a marker attribute so a second run over
    /// the same output leaves them alone.
    pub mark_captions: bool,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            template: None,
            document_types: vec!["Conceptual".to_string()],
            mark_captions: true,
            processing: ProcessingConfig::default(),
        }
    }
}

impl LegendConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_types.is_empty() {
            return Err(ConfigError::Validation(
                "document_types must not be empty".into(),
            ));
        }
        if self.document_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "document_types entries must not be blank".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve a relative `template` path against the directory the config
    /// file lives in.
    fn anchor_template(&mut self, config_dir: &Path) {
        if let Some(template) = self.template.take() {
            self.template = Some(if template.is_relative() {
                config_dir.join(template)
            } else {
                template
            });
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of files processed at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(LegendConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<LegendConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: LegendConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<LegendConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    let mut config = resolve_config(Some(overlay))?;
    config.anchor_template(path.parent().unwrap_or(Path::new(".")));
    Ok(config)
}

/// Load `image-legend.toml` from `dir`, or the stock defaults if there is none.
pub fn load_config(dir: &Path) -> Result<LegendConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `image-legend.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-legend configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Caption template: an HTML fragment with two placeholders.
#   {title} -> the image's title attribute, HTML-escaped
#   {img}   -> the original <img> element
# Relative paths are resolved against this file's directory.
# Omit to use the bundled template:
#   <figure class="image-legend">{img}<figcaption>{title}</figcaption></figure>
# template = "templates/legend.html"

# Manifest item types whose HTML outputs get captions (manifest mode only).
document_types = ["Conceptual"]

# Stamp each caption with a data-image-legend attribute. Images inside a
# stamped caption are skipped, so running twice over the same output is safe.
mark_captions = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of files processed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
