use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};

/// Decoded raster in straight-alpha RGBA8.
///
/// Rasters are immutable and cheap to clone: crop and resize always produce a new raster and the
/// pixel buffer is shared between clones.
#[derive(Clone, Debug)]
pub struct Raster {
    image: Arc<image::RgbaImage>,
}

impl Raster {
    /// Wrap an owned RGBA8 image.
    pub fn new(image: image::RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Build a raster from tightly packed straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> PosterResult<Self> {
        if width == 0 || height == 0 {
            return Err(PosterError::validation("raster width/height must be > 0"));
        }
        let image = image::RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| PosterError::validation("raster byte length mismatch"))?;
        Ok(Self::new(image))
    }

    /// A raster filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(image::RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            image::Rgba(rgba),
        ))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raster size as a canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width(), self.height())
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &image::RgbaImage {
        &self.image
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Return `true` when both rasters share the same pixel buffer.
    pub fn ptr_eq(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// Copy a sub-rectangle into a new raster.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> PosterResult<Raster> {
        if width == 0 || height == 0 {
            return Err(PosterError::validation("crop width/height must be > 0"));
        }
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width());
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height());
        if !fits_x || !fits_y {
            return Err(PosterError::validation(format!(
                "crop {width}x{height}+{x}+{y} exceeds raster {}x{}",
                self.width(),
                self.height()
            )));
        }
        let view = image::imageops::crop_imm(self.image.as_ref(), x, y, width, height);
        Ok(Raster::new(view.to_image()))
    }

    /// Premultiplied RGBA8 copy of the pixels.
    pub fn to_premul_bytes(&self) -> Vec<u8> {
        let mut bytes = self.image.as_raw().clone();
        premultiply_rgba8_in_place(&mut bytes);
        bytes
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = (((*c as u16) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
