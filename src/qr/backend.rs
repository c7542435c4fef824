//! QR encoder trait and shared types.
//!
//! [`QrEncoder`] is the seam between the emitter and the actual encoding
//! work. The production implementation is
//! [`QrcodeEncoder`](super::qrcode_backend::QrcodeEncoder); tests swap in
//! recording, failing or slow encoders.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("QR generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("QR worker exited without a result")]
    WorkerLost,
}

/// Everything needed to produce one QR image.
#[derive(Debug, Clone, PartialEq)]
pub struct QrParams {
    /// Text to encode (the collection URL).
    pub data: String,
    /// PNG destination.
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Quiet zone in modules.
    pub margin: u32,
}

/// Encodes text into a black-on-white PNG.
///
/// Implementations run on worker threads, hence `Send + Sync`.
pub trait QrEncoder: Send + Sync {
    fn write_png(&self, params: &QrParams) -> Result<(), QrError>;
}
