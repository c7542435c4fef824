//! Production QR encoder: `qrcode` for the symbol, `image` for the PNG.

use super::backend::{QrEncoder, QrError, QrParams};
use super::calculations::RasterGeometry;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl QrcodeEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrEncoder for QrcodeEncoder {
    fn write_png(&self, params: &QrParams) -> Result<(), QrError> {
        let image = render(&params.data, params.width, params.margin)?;
        image.save_with_format(&params.output, ImageFormat::Png)?;
        Ok(())
    }
}

/// Rasterise `data` as a square black-on-white image.
pub fn render(data: &str, width: u32, margin: u32) -> Result<GrayImage, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| QrError::Encode(e.to_string()))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let geometry = RasterGeometry::new(modules, margin, width);

    Ok(GrayImage::from_fn(
        geometry.image_width,
        geometry.image_width,
        |x, y| match (geometry.module_at(x), geometry.module_at(y)) {
            (Some(col), Some(row)) if colors[(row * modules + col) as usize] == Color::Dark => {
                DARK
            }
            _ => LIGHT,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://x.io/smart_rev.html?loc=1";

    #[test]
    fn render_has_requested_width() {
        let image = render(URL, 300, 2).unwrap();
        assert_eq!(image.dimensions(), (300, 300));
    }

    #[test]
    fn render_is_black_and_white_only() {
        let image = render(URL, 300, 2).unwrap();
        assert!(image.pixels().all(|p| *p == DARK || *p == LIGHT));
        assert!(image.pixels().any(|p| *p == DARK));
    }

    #[test]
    fn quiet_zone_is_white_and_finder_is_dark() {
        let image = render(URL, 300, 2).unwrap();
        let modules = QrCode::with_error_correction_level(URL.as_bytes(), EcLevel::M)
            .unwrap()
            .width() as u32;
        let geometry = RasterGeometry::new(modules, 2, 300);
        let first = geometry.margin_px.ceil() as u32;

        assert_eq!(*image.get_pixel(0, 0), LIGHT);
        assert_eq!(*image.get_pixel(299, 299), LIGHT);
        assert_eq!(*image.get_pixel(first.saturating_sub(1), first), LIGHT);
        // Top-left finder pattern starts with a dark module.
        assert_eq!(*image.get_pixel(first, first), DARK);
    }

    #[test]
    fn render_is_deterministic() {
        assert_eq!(render(URL, 300, 2).unwrap(), render(URL, 300, 2).unwrap());
    }

    #[test]
    fn oversized_data_is_an_encode_error() {
        let data = "x".repeat(8000);
        assert!(matches!(render(&data, 300, 2), Err(QrError::Encode(_))));
    }

    #[test]
    fn write_png_creates_readable_file() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("cafe.png");
        QrcodeEncoder::new()
            .write_png(&QrParams {
                data: URL.to_string(),
                output: output.clone(),
                width: 300,
                margin: 2,
            })
            .unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (300, 300));
    }

    #[test]
    fn write_png_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let result = QrcodeEncoder::new().write_png(&QrParams {
            data: URL.to_string(),
            output: tmp.path().join("missing/cafe.png"),
            width: 300,
            margin: 2,
        });
        assert!(result.is_err());
    }
}
