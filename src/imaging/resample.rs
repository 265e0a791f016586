use image::imageops::{self, FilterType};

use crate::assets::raster::Raster;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};

/// Rectangle of the source kept by a center crop, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Largest window of the target's aspect ratio that fits the source, centered.
///
/// A source wider than the target keeps its full height and loses its sides; anything else keeps
/// its full width and loses top and bottom.
pub fn center_crop_window(source: (u32, u32), target: (u32, u32)) -> PosterResult<CropWindow> {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if src_w == 0 || src_h == 0 {
        return Err(PosterError::validation("source width/height must be > 0"));
    }
    if tgt_w == 0 || tgt_h == 0 {
        return Err(PosterError::validation("target width/height must be > 0"));
    }

    let src_aspect = f64::from(src_w) / f64::from(src_h);
    let tgt_aspect = f64::from(tgt_w) / f64::from(tgt_h);

    if src_aspect > tgt_aspect {
        let height = src_h;
        let width = ((f64::from(height) * tgt_aspect).round() as u32).clamp(1, src_w);
        Ok(CropWindow {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height,
        })
    } else {
        let width = src_w;
        let height = ((f64::from(width) / tgt_aspect).round() as u32).clamp(1, src_h);
        Ok(CropWindow {
            x: 0,
            y: (src_h - height) / 2,
            width,
            height,
        })
    }
}

/// Produces a raster of exactly the requested size from an arbitrary source.
pub trait Resampler: Send + Sync {
    /// Center-crop `src` to the target aspect ratio and scale it to `width x height`.
    fn resize_to_fit(&self, src: &Raster, width: u32, height: u32) -> PosterResult<Raster>;
}

/// Unsharp-mask parameters applied after downsampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sharpening {
    /// Gaussian sigma of the mask.
    pub sigma: f32,
    /// Minimum per-channel difference that gets sharpened.
    pub threshold: i32,
}

impl Default for Sharpening {
    fn default() -> Self {
        Self {
            sigma: 0.5,
            threshold: 1,
        }
    }
}

/// Production resampler: center crop, Lanczos3 resize, then a light unsharp mask.
#[derive(Clone, Debug)]
pub struct LanczosResampler {
    /// Post-resize sharpening; `None` disables it.
    pub sharpening: Option<Sharpening>,
}

impl Default for LanczosResampler {
    fn default() -> Self {
        Self::new(Some(Sharpening::default()))
    }
}

impl LanczosResampler {
    /// Resampler with the given post-resize sharpening.
    pub fn new(sharpening: Option<Sharpening>) -> Self {
        Self { sharpening }
    }
}

impl Resampler for LanczosResampler {
    #[tracing::instrument(
        level = "debug",
        skip(self, src),
        fields(src_w = src.width(), src_h = src.height())
    )]
    fn resize_to_fit(&self, src: &Raster, width: u32, height: u32) -> PosterResult<Raster> {
        let window = center_crop_window(src.dimensions(), (width, height))?;
        let cropped = if window.width == src.width() && window.height == src.height() {
            src.clone()
        } else {
            src.crop(window.x, window.y, window.width, window.height)?
        };

        if cropped.dimensions() == (width, height) {
            return Ok(cropped);
        }

        let resized = imageops::resize(cropped.as_image(), width, height, FilterType::Lanczos3);
        let out = match self.sharpening {
            Some(s) => imageops::unsharpen(&resized, s.sigma, s.threshold),
            None => resized,
        };
        if out.dimensions() != (width, height) {
            return Err(PosterError::resample_degraded(format!(
                "resampler produced {}x{}, expected {width}x{height}",
                out.width(),
                out.height()
            )));
        }
        Ok(Raster::new(out))
    }
}

/// Outcome of fitting a background to a canvas.
#[derive(Clone, Debug)]
pub enum Fitted {
    /// Exactly canvas-sized.
    Exact(Raster),
    /// The resampler failed; the unscaled source must be covered onto the canvas at draw time.
    Unscaled(Raster),
}

impl Fitted {
    /// Return `true` for the degraded path.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Unscaled(_))
    }

    /// The raster that will be drawn.
    pub fn raster(&self) -> &Raster {
        match self {
            Self::Exact(r) | Self::Unscaled(r) => r,
        }
    }
}

/// Run `resampler`, falling back to the unscaled source when it fails.
pub fn fit_or_degrade(resampler: &dyn Resampler, src: &Raster, canvas: Canvas) -> Fitted {
    match resampler.resize_to_fit(src, canvas.width, canvas.height) {
        Ok(r) => Fitted::Exact(r),
        Err(e) => {
            let e = match e {
                PosterError::ResampleDegraded(_) => e,
                other => PosterError::resample_degraded(other.to_string()),
            };
            tracing::warn!(
                error = %e,
                target_w = canvas.width,
                target_h = canvas.height,
                "falling back to unscaled background"
            );
            Fitted::Unscaled(src.clone())
        }
    }
}

/// Affine that covers `canvas` with an image of `src` size, centered, preserving aspect.
pub fn cover_transform(src: (u32, u32), canvas: Canvas) -> kurbo::Affine {
    let (sw, sh) = (f64::from(src.0.max(1)), f64::from(src.1.max(1)));
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let scale = (cw / sw).max(ch / sh);
    let tx = (cw - sw * scale) / 2.0;
    let ty = (ch - sh * scale) / 2.0;
    kurbo::Affine::translate((tx, ty)) * kurbo::Affine::scale(scale)
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/resample.rs"]
mod tests;
