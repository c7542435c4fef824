//! Build settings.
//!
//! Loads the optional `smart-rev.toml` that tunes output names, QR geometry and
//! page text. The location file itself is handled by [`crate::parse`]; this
//! module only covers how artifacts are produced.
//!
//! ## Config File Location
//!
//! Looked up next to the input file unless `--config` points elsewhere:
//!
//! ```text
//! site/
//! ├── 2_enter_location_details_here.txt
//! └── smart-rev.toml           # optional
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! page = "smart_rev.html"               # Page name, also used in every link
//! links = "generated_review_links.txt"  # Link manifest
//! qr_dir = "qrcodes"                    # QR image directory
//!
//! [qr]
//! width = 300          # PNG width in pixels (1-4096)
//! margin = 2           # Quiet zone, in modules (0-64)
//! timeout_secs = 10    # Per-location encoding budget
//!
//! [page]
//! title = "Leave a Review"
//!
//! [processing]
//! max_processes = 4    # Max parallel QR workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: stock defaults are serialized to a TOML table and
//! the user file is merged over it key by key. Unknown keys are rejected to
//! catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name looked up next to the input file.
pub const CONFIG_FILENAME: &str = "smart-rev.toml";

/// Largest accepted `qr.width`, in pixels.
pub const MAX_QR_WIDTH: u32 = 4096;
/// Largest accepted `qr.margin`, in modules.
pub const MAX_QR_MARGIN: u32 = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build settings loaded from `smart-rev.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Output file and directory names.
    pub output: OutputConfig,
    /// QR image geometry and limits.
    pub qr: QrConfig,
    /// Page text.
    pub page: PageConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("output.page", &self.output.page),
            ("output.links", &self.output.links),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
            if value.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a file name, not a path"
                )));
            }
        }
        if self.output.qr_dir.is_empty() {
            return Err(ConfigError::Validation(
                "output.qr_dir must not be empty".into(),
            ));
        }
        if self.qr.width == 0 || self.qr.width > MAX_QR_WIDTH {
            return Err(ConfigError::Validation(format!(
                "qr.width must be between 1 and {MAX_QR_WIDTH}"
            )));
        }
        if self.qr.margin > MAX_QR_MARGIN {
            return Err(ConfigError::Validation(format!(
                "qr.margin must be at most {MAX_QR_MARGIN}"
            )));
        }
        if self.qr.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "qr.timeout_secs must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output names, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Review page file name. Collection links point at `<domain>/<page>`.
    pub page: String,
    /// Link manifest file name.
    pub links: String,
    /// Directory holding one PNG per location.
    pub qr_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            page: "smart_rev.html".to_string(),
            links: "generated_review_links.txt".to_string(),
            qr_dir: "qrcodes".to_string(),
        }
    }
}

/// QR image settings. Images are always black on white.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Image width (and height) in pixels.
    pub width: u32,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Seconds a single location may spend encoding before it is reported as failed.
    pub timeout_secs: u64,
}

impl QrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            width: 300,
            margin: 2,
            timeout_secs: 10,
        }
    }
}

/// Page text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Document `<title>`.
    pub title: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Leave a Review".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel QR workers.
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
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load settings from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `smart-rev.toml` from `dir`, falling back to defaults when absent.
pub fn load_config(dir: &Path) -> Result<BuildConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        tracing::debug!("no {} in {}, using defaults", CONFIG_FILENAME, dir.display());
        return resolve_config(None);
    }
    tracing::debug!("loading settings from {}", path.display());
    load_config_file(&path)
}

/// Returns a fully-commented stock `smart-rev.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# smart-rev Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to your location file, or pass --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output names (relative to the output directory)
# ---------------------------------------------------------------------------
[output]
# Review page file name. Every collection link and QR code points at
# <domain>/<page>?loc=<id>, so changing this invalidates printed codes.
page = "smart_rev.html"

# One "<name>: <link>" line per location.
links = "generated_review_links.txt"

# Directory for the per-location QR images (created if missing).
qr_dir = "qrcodes"

# ---------------------------------------------------------------------------
# QR images (black on white PNG)
# ---------------------------------------------------------------------------
[qr]
# Image width and height in pixels (1 to 4096).
width = 300

# Quiet zone around the code, in modules (at most 64).
margin = 2

# Seconds one location may take before it is reported as failed.
timeout_secs = 10

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[page]
# Browser tab title.
title = "Leave a Review"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel QR workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
