use image::imageops::{self, FilterType};

use crate::assets::color::Color;
use crate::assets::raster::Raster;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};
use crate::imaging::resample::{Resampler, fit_or_degrade};
use crate::platform::registry::PlatformRegistry;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::{BackgroundOp, RenderPlan};
use crate::scene::layer::TextLayer;

/// Fill used when the poster has no background image.
pub const EMPTY_BACKGROUND: Color = Color::rgb(0xE5, 0xE7, 0xEB);

/// Pick the background operation for `canvas`.
///
/// A `derived` raster is only reused when it is exactly canvas-sized; otherwise `original` is fitted
/// again.
pub fn background_op(
    resampler: &dyn Resampler,
    original: Option<&Raster>,
    derived: Option<&Raster>,
    canvas: Canvas,
) -> BackgroundOp {
    if let Some(d) = derived.filter(|d| d.canvas() == canvas) {
        return BackgroundOp::Exact(d.clone());
    }
    match original {
        Some(src) => fit_or_degrade(resampler, src, canvas).into(),
        None => BackgroundOp::Solid(EMPTY_BACKGROUND),
    }
}

/// Resolve the platform size, fit the background and flatten `layers` over it.
///
/// Layer geometry is used exactly as stored, whatever canvas it was authored against.
#[tracing::instrument(level = "debug", skip(backend, resampler, registry, background, layers))]
pub fn compose(
    backend: &mut dyn RenderBackend,
    resampler: &dyn Resampler,
    registry: &PlatformRegistry,
    platform: &str,
    background: Option<&Raster>,
    layers: &[TextLayer],
) -> PosterResult<FrameRGBA> {
    let canvas = registry.size_of(platform)?;
    let plan = RenderPlan {
        canvas,
        background: background_op(resampler, background, None, canvas),
        layers: layers.to_vec(),
        overlay: None,
    };
    render(backend, &plan)
}

/// Execute a prepared plan and check the frame it produced.
pub fn render(backend: &mut dyn RenderBackend, plan: &RenderPlan) -> PosterResult<FrameRGBA> {
    let frame = backend.render_plan(plan)?;
    if (frame.width, frame.height) != (plan.canvas.width, plan.canvas.height)
        || frame.data.len() != plan.canvas.rgba_len()
    {
        return Err(PosterError::render(format!(
            "backend produced {}x{} for a {}x{} canvas",
            frame.width, frame.height, plan.canvas.width, plan.canvas.height
        )));
    }
    Ok(frame)
}

/// Shrink a full-resolution frame for display. Zoom factors of 1 or more return the frame as-is.
pub fn scale_for_display(frame: FrameRGBA, zoom: f64) -> PosterResult<FrameRGBA> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(PosterError::validation("preview zoom must be finite and > 0"));
    }
    if zoom >= 1.0 {
        return Ok(frame);
    }

    let w = ((f64::from(frame.width) * zoom).round() as u32).max(1);
    let h = ((f64::from(frame.height) * zoom).round() as u32).max(1);
    let premultiplied = frame.premultiplied;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or_else(|| PosterError::render("frame buffer does not match its dimensions"))?;
    let small = imageops::resize(&img, w, h, FilterType::Triangle);
    Ok(FrameRGBA {
        width: w,
        height: h,
        data: small.into_raw(),
        premultiplied,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/compose.rs"]
mod tests;
