//! QR code images.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Symbol matrix** | `qrcode::QrCode` (error correction level M) |
//! | **Rasterise** | [`RasterGeometry`] + `image::GrayImage` |
//! | **Write** | `image` PNG encoder |
//!
//! The module is split into:
//! - **Calculations**: pixel → module mapping for a given width and quiet zone (unit testable)
//! - **Backend**: [`QrEncoder`] trait, [`QrParams`], [`QrError`]
//! - **qrcode_backend**: [`QrcodeEncoder`], the production encoder

pub mod backend;
mod calculations;
pub mod qrcode_backend;

pub use backend::{QrEncoder, QrError, QrParams};
pub use calculations::RasterGeometry;
pub use qrcode_backend::QrcodeEncoder;
