//! End-to-end build: parse → render → emit.
//!
//! Every fatal problem (unreadable or malformed input, unusable settings) is
//! detected before anything is written, so a failed run leaves the output
//! directory exactly as it was. Once emission starts, only a failure to write
//! the page or the link manifest aborts; QR problems end up in the report.

use crate::config::BuildConfig;
use crate::emit::{self, EmitError, EmitEvent, EmitOptions, EmitReport};
use crate::generate::{self, GenerateError};
use crate::parse::{self, Diagnostic, ParseError};
use crate::qr::QrEncoder;
use crate::types::Config;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub config: Config,
    pub diagnostics: Vec<Diagnostic>,
    pub emitted: EmitReport,
}

/// Result of `check`: the parsed input and nothing written.
#[derive(Debug)]
pub struct CheckReport {
    pub config: Config,
    pub diagnostics: Vec<Diagnostic>,
    /// `(stem, names)` for locations that would overwrite each other's QR.
    pub shared_qr_files: Vec<(String, Vec<String>)>,
}

/// Run the whole build for `input`, writing into `output_dir`.
pub fn run<E: QrEncoder + 'static>(
    input: &Path,
    output_dir: &Path,
    settings: &BuildConfig,
    encoder: Arc<E>,
    options: EmitOptions,
    events: Option<Sender<EmitEvent>>,
) -> Result<BuildReport, BuildError> {
    tracing::info!("reading {}", input.display());
    let parsed = parse::load(input)?;
    tracing::info!(
        "{} locations, {} skipped",
        parsed.config.locations.len(),
        parsed.diagnostics.len()
    );

    let page = generate::render_page(&parsed.config, &settings.page)?;
    let emitted = emit::emit(
        &parsed.config,
        &page,
        output_dir,
        settings,
        encoder,
        options,
        events,
    )?;

    Ok(BuildReport {
        config: parsed.config,
        diagnostics: parsed.diagnostics,
        emitted,
    })
}

/// Parse `input` and report what a build would produce, without writing.
pub fn check(input: &Path) -> Result<CheckReport, BuildError> {
    let parsed = parse::load(input)?;
    let shared_qr_files = crate::naming::duplicate_stems(&parsed.config.locations)
        .into_iter()
        .map(|(stem, names)| (stem, names.into_iter().map(str::to_string).collect()))
        .collect();
    Ok(CheckReport {
        config: parsed.config,
        diagnostics: parsed.diagnostics,
        shared_qr_files,
    })
}
