//! Artifact emission.
//!
//! Stage 3 of the pipeline. Writes everything a business owner distributes:
//!
//! ```text
//! out/
//! ├── smart_rev.html                # the review page (overwritten)
//! ├── generated_review_links.txt    # "<name>: <collection url>" per location
//! └── qrcodes/
//!     ├── main_street_cafe.png      # one QR per location
//!     └── harbour_kiosk.png
//! ```
//!
//! ## Independence of outputs
//!
//! The page and the link manifest are written first and never depend on QR
//! results. QR images are produced afterwards; a failure (encoder error, I/O
//! error, timeout) is recorded for that location only and the others carry on.
//!
//! ## Parallel QR generation
//!
//! Jobs fan out over the [rayon](https://docs.rs/rayon) pool. Each job hands
//! the encoder to a dedicated worker thread and waits at most
//! `qr.timeout_secs`; a worker that misses the deadline is abandoned, its
//! staging file is discarded and the location is reported as timed out.
//! Results are collected in location order whatever order the jobs finish in.
//!
//! ## Shared file names
//!
//! Two names can sanitize to the same stem (`Big Cafe`, `big-cafe`). Only the
//! last such location in input order is encoded; the earlier ones are
//! reported as [`QrOutcome::Superseded`].

use crate::config::BuildConfig;
use crate::naming;
use crate::qr::{QrEncoder, QrError, QrParams};
use crate::types::{Config, Location};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress events streamed while emitting.
#[derive(Debug, Clone, PartialEq)]
pub enum EmitEvent {
    PageWritten { path: PathBuf },
    LinksWritten { path: PathBuf, count: usize },
    QrWritten { name: String, path: PathBuf },
    QrFailed { name: String, error: String },
}

/// What happened to one location's QR image.
#[derive(Debug)]
pub enum QrOutcome {
    Written(PathBuf),
    Failed(QrError),
    /// Another location later in the input writes the same file.
    Superseded { by: String },
    /// QR generation was switched off for this run.
    Skipped,
}

/// Per-location emission record, in location order.
#[derive(Debug)]
pub struct LocationReport {
    pub id: String,
    pub name: String,
    pub url: String,
    pub qr: QrOutcome,
}

#[derive(Debug)]
pub struct EmitReport {
    pub page: PathBuf,
    pub links: PathBuf,
    pub locations: Vec<LocationReport>,
}

impl EmitReport {
    pub fn qr_failures(&self) -> impl Iterator<Item = &LocationReport> {
        self.locations
            .iter()
            .filter(|l| matches!(l.qr, QrOutcome::Failed(_)))
    }
}

/// Emission switches that are not part of the settings file.
#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    pub generate_qr: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { generate_qr: true }
    }
}

/// The link manifest: `"<name>: <collection url>"` per location, newline-joined.
pub fn link_manifest(config: &Config, page_name: &str) -> String {
    config
        .locations
        .iter()
        .map(|l| {
            format!(
                "{}: {}",
                l.name,
                naming::collection_url(&config.domain, page_name, &l.id)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write page, link manifest and QR images under `output_dir`.
///
/// Only failures to write the page or the manifest are errors; QR problems are
/// reported per location in the returned [`EmitReport`].
pub fn emit<E: QrEncoder + 'static>(
    config: &Config,
    page_html: &str,
    output_dir: &Path,
    settings: &BuildConfig,
    encoder: Arc<E>,
    options: EmitOptions,
    events: Option<Sender<EmitEvent>>,
) -> Result<EmitReport, EmitError> {
    let output = &settings.output;
    create_dir(output_dir)?;

    let page_path = output_dir.join(&output.page);
    write_file(&page_path, page_html)?;
    tracing::info!("wrote {}", page_path.display());
    send(&events, EmitEvent::PageWritten {
        path: page_path.clone(),
    });

    let links_path = output_dir.join(&output.links);
    write_file(&links_path, &link_manifest(config, &output.page))?;
    tracing::info!("wrote {} ({} links)", links_path.display(), config.locations.len());
    send(&events, EmitEvent::LinksWritten {
        path: links_path.clone(),
        count: config.locations.len(),
    });

    let urls: Vec<String> = config
        .locations
        .iter()
        .map(|l| naming::collection_url(&config.domain, &output.page, &l.id))
        .collect();

    let outcomes = if options.generate_qr {
        emit_qr_codes(config, &urls, output_dir, settings, encoder, &events)
    } else {
        tracing::info!("QR generation disabled");
        config.locations.iter().map(|_| QrOutcome::Skipped).collect()
    };

    let locations = config
        .locations
        .iter()
        .zip(urls)
        .zip(outcomes)
        .map(|((location, url), qr)| LocationReport {
            id: location.id.clone(),
            name: location.name.clone(),
            url,
            qr,
        })
        .collect();

    Ok(EmitReport {
        page: page_path,
        links: links_path,
        locations,
    })
}

fn emit_qr_codes<E: QrEncoder + 'static>(
    config: &Config,
    urls: &[String],
    output_dir: &Path,
    settings: &BuildConfig,
    encoder: Arc<E>,
    events: &Option<Sender<EmitEvent>>,
) -> Vec<QrOutcome> {
    let qr_dir = output_dir.join(&settings.output.qr_dir);
    if let Err(err) = fs::create_dir_all(&qr_dir) {
        tracing::error!("cannot create {}: {err}", qr_dir.display());
        return config
            .locations
            .iter()
            .map(|location| {
                let error = QrError::Io(io::Error::new(
                    err.kind(),
                    format!("cannot create {}: {err}", qr_dir.display()),
                ));
                send(events, EmitEvent::QrFailed {
                    name: location.name.clone(),
                    error: error.to_string(),
                });
                QrOutcome::Failed(error)
            })
            .collect();
    }

    for (stem, names) in naming::duplicate_stems(&config.locations) {
        tracing::warn!(
            "locations {:?} share the QR file {stem}.png; only the last one is kept",
            names
        );
    }
    let winners = last_location_per_file(&config.locations);

    let timeout = settings.qr.timeout();
    config
        .locations
        .par_iter()
        .zip(urls.par_iter())
        .map(|(location, url)| {
            let file_name = naming::qr_file_name(&location.name);
            match winners.get(&file_name) {
                Some(winner) if *winner != location.id => {
                    return QrOutcome::Superseded {
                        by: winner.to_string(),
                    };
                }
                _ => {}
            }

            let params = QrParams {
                data: url.clone(),
                output: qr_dir.join(&file_name),
                width: settings.qr.width,
                margin: settings.qr.margin,
            };
            let path = params.output.clone();

            match run_with_timeout(&encoder, params, timeout) {
                Ok(()) => {
                    tracing::debug!("generated QR code for {}", location.name);
                    send(events, EmitEvent::QrWritten {
                        name: location.name.clone(),
                        path: path.clone(),
                    });
                    QrOutcome::Written(path)
                }
                Err(error) => {
                    tracing::warn!("QR code for {} failed: {error}", location.name);
                    send(events, EmitEvent::QrFailed {
                        name: location.name.clone(),
                        error: error.to_string(),
                    });
                    QrOutcome::Failed(error)
                }
            }
        })
        .collect()
}

/// File name → id of the last location writing it.
fn last_location_per_file(locations: &[Location]) -> HashMap<String, &str> {
    locations
        .iter()
        .map(|l| (naming::qr_file_name(&l.name), l.id.as_str()))
        .collect()
}

/// Run one encoding job on its own thread, giving up after `timeout`.
///
/// The worker encodes into a staging file beside the target and moves it into
/// place only while the job is still wanted. A worker that finishes after the
/// deadline deletes its staging file, so a timed-out location leaves no image.
fn run_with_timeout<E: QrEncoder + 'static>(
    encoder: &Arc<E>,
    params: QrParams,
    timeout: Duration,
) -> Result<(), QrError> {
    let target = params.output.clone();
    let staging = staging_path(&target);
    let job = QrParams {
        output: staging.clone(),
        ..params
    };
    let abandoned = Arc::new(Mutex::new(false));
    let (tx, rx) = mpsc::channel();

    let encoder = Arc::clone(encoder);
    let worker_abandoned = Arc::clone(&abandoned);
    std::thread::Builder::new()
        .name("qr-worker".to_string())
        .spawn(move || {
            let result = encoder.write_png(&job);
            // Held until the result is sent, so the deadline check below sees
            // either a finished job or an abandoned one.
            let abandoned = worker_abandoned
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *abandoned {
                tracing::debug!("discarding late QR output {}", job.output.display());
                fs::remove_file(&job.output).ok();
                return;
            }
            let result = result.and_then(|()| Ok(fs::rename(&job.output, &target)?));
            if result.is_err() {
                fs::remove_file(&job.output).ok();
            }
            tx.send(result).ok();
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            let mut abandoned = abandoned.lock().unwrap_or_else(PoisonError::into_inner);
            match rx.try_recv() {
                Ok(result) => result,
                Err(_) => {
                    *abandoned = true;
                    Err(QrError::Timeout(timeout))
                }
            }
        }
        Err(RecvTimeoutError::Disconnected) => {
            fs::remove_file(&staging).ok();
            Err(QrError::WorkerLost)
        }
    }
}

/// `qrcodes/cafe.png` → `qrcodes/.cafe.png.part`
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.part"))
}

fn send(events: &Option<Sender<EmitEvent>>, event: EmitEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

fn create_dir(path: &Path) -> Result<(), EmitError> {
    fs::create_dir_all(path).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    fs::write(path, contents).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}
