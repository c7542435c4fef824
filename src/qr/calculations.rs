//! Pure raster math: where each module lands in the output image.
//!
//! The image is square. With `n` modules and a quiet zone of `m` modules the
//! symbol spans `n + 2m` module widths, so one module is
//! `width / (n + 2m)` pixels. Fractional scales are fine: each pixel samples
//! the module under its top-left corner. A width too small to give every
//! module at least one pixel falls back to 4 px per module.

/// Fallback pixels per module when the requested width is too small.
pub const FALLBACK_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGeometry {
    /// Modules per side of the symbol, without quiet zone.
    pub modules: u32,
    /// Pixels per module.
    pub scale: f64,
    /// Output image side in pixels.
    pub image_width: u32,
    /// Quiet zone in pixels.
    pub margin_px: f64,
}

impl RasterGeometry {
    pub fn new(modules: u32, margin: u32, width: u32) -> Self {
        let span = modules + margin * 2;
        let (scale, image_width) = if span > 0 && width >= span {
            (width as f64 / span as f64, width)
        } else {
            (FALLBACK_SCALE, span * FALLBACK_SCALE as u32)
        };
        Self {
            modules,
            scale,
            image_width,
            margin_px: margin as f64 * scale,
        }
    }

    /// Module index along one axis for pixel `px`, or `None` inside the quiet zone.
    pub fn module_at(&self, px: u32) -> Option<u32> {
        let px = px as f64;
        let end = self.image_width as f64 - self.margin_px;
        if px < self.margin_px || px >= end {
            return None;
        }
        let module = ((px - self.margin_px) / self.scale).floor() as u32;
        Some(module.min(self.modules.saturating_sub(1)))
    }
}
