use std::str::FromStr;
use std::time::{Duration, Instant};

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::assets::raster::Raster;
use crate::foundation::error::{PosterError, PosterResult};

/// Crop rectangle in original-image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Return `true` when the rectangle lies within a `width x height` image.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }
}

/// Partial rectangle update. Omitted or non-finite fields keep their previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropRectPatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
}

/// Named crop aspect ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropPreset {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16
    #[serde(rename = "9:16")]
    Portrait,
    /// 4:3
    #[serde(rename = "4:3")]
    Classic,
}

impl CropPreset {
    /// Width and height terms of the ratio.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Landscape => (16, 9),
            Self::Portrait => (9, 16),
            Self::Classic => (4, 3),
        }
    }
}

impl FromStr for CropPreset {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1:1" | "square" => Ok(Self::Square),
            "16:9" | "landscape" => Ok(Self::Landscape),
            "9:16" | "portrait" => Ok(Self::Portrait),
            "4:3" | "classic" => Ok(Self::Classic),
            other => Err(PosterError::validation(format!(
                "unknown crop preset '{other}'"
            ))),
        }
    }
}

/// Crop tool tuning.
#[derive(Clone, Debug)]
pub struct CropOpts {
    /// Smallest allowed side, capped by the image's own side.
    pub min_size: u32,
    /// Side of the initial square relative to the image's shorter side.
    pub initial_fraction: f64,
    /// Quiet period after the last edit before the preview is rebuilt.
    pub preview_debounce: Duration,
    /// Longest edge of the preview raster.
    pub preview_max_edge: u32,
}

impl Default for CropOpts {
    fn default() -> Self {
        Self {
            min_size: 50,
            initial_fraction: 0.8,
            preview_debounce: Duration::from_millis(150),
            preview_max_edge: 512,
        }
    }
}

#[derive(Clone, Debug)]
struct CropSession {
    rect: CropRect,
    image_w: u32,
    image_h: u32,
    edited_at: Instant,
    stale: bool,
    preview: Option<Raster>,
}

/// Rectangle-selection state machine over the original background.
///
/// `Idle -> Active -> Idle`, leaving `Active` through [`CropTool::commit`] or
/// [`CropTool::cancel`]. Every rectangle handed out satisfies the bounds and minimum-size
/// constraints.
#[derive(Clone, Debug, Default)]
pub struct CropTool {
    opts: CropOpts,
    session: Option<CropSession>,
}

impl CropTool {
    /// Idle tool with the given options.
    pub fn new(opts: CropOpts) -> Self {
        Self {
            opts,
            session: None,
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> &CropOpts {
        &self.opts
    }

    /// Return `true` while a session is open.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current rectangle, if a session is open.
    pub fn rect(&self) -> Option<CropRect> {
        self.session.as_ref().map(|s| s.rect)
    }

    /// Open a session on an image of `width x height` with a centered square.
    pub fn start(&mut self, width: u32, height: u32) -> PosterResult<CropRect> {
        if self.session.is_some() {
            return Err(PosterError::validation("crop session already active"));
        }
        if width == 0 || height == 0 {
            return Err(PosterError::validation("cannot crop an empty image"));
        }

        let short = width.min(height);
        let fraction = if self.opts.initial_fraction.is_finite() {
            self.opts.initial_fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let side = ((f64::from(short) * fraction).floor() as u32)
            .clamp(self.opts.min_size.min(short), short);
        let rect = CropRect {
            x: (width - side) / 2,
            y: (height - side) / 2,
            width: side,
            height: side,
        };

        tracing::debug!(?rect, width, height, "crop session started");
        self.session = Some(CropSession {
            rect,
            image_w: width,
            image_h: height,
            edited_at: Instant::now(),
            stale: true,
            preview: None,
        });
        Ok(rect)
    }

    /// Merge `patch` into the rectangle and clamp the result into the image.
    pub fn update_rect(&mut self, patch: CropRectPatch) -> PosterResult<CropRect> {
        let min_size = self.opts.min_size;
        let s = self.active_mut()?;
        s.rect = clamp_rect(s.rect, patch, s.image_w, s.image_h, min_size);
        s.mark_edited();
        Ok(s.rect)
    }

    /// Replace the rectangle with the largest centered one of the preset's ratio.
    pub fn apply_preset(&mut self, preset: CropPreset) -> PosterResult<CropRect> {
        let min_size = self.opts.min_size;
        let s = self.active_mut()?;
        s.rect = preset_rect(preset, s.image_w, s.image_h, min_size);
        s.mark_edited();
        tracing::debug!(?preset, rect = ?s.rect, "crop preset applied");
        Ok(s.rect)
    }

    /// Cut the rectangle out of `original` and close the session.
    ///
    /// The session stays open if `original` does not match the image the session was started on.
    #[tracing::instrument(level = "debug", skip(self, original))]
    pub fn commit(&mut self, original: &Raster) -> PosterResult<Raster> {
        let s = self.active_mut()?;
        if original.dimensions() != (s.image_w, s.image_h) {
            return Err(PosterError::validation(format!(
                "crop session was opened on a {}x{} image, got {}x{}",
                s.image_w,
                s.image_h,
                original.width(),
                original.height()
            )));
        }
        let r = s.rect;
        let out = original.crop(r.x, r.y, r.width, r.height)?;
        self.session = None;
        tracing::debug!(rect = ?r, "crop committed");
        Ok(out)
    }

    /// Close the session without touching anything. Returns `false` when idle.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.session.take().is_some();
        if was_active {
            tracing::debug!("crop cancelled");
        }
        was_active
    }

    /// Rebuild the preview once the debounce period since the last edit has passed.
    ///
    /// Returns the fresh preview when one was built, `None` when nothing changed or the quiet
    /// period has not elapsed yet.
    pub fn poll_preview(&mut self, original: &Raster, now: Instant) -> Option<Raster> {
        let debounce = self.opts.preview_debounce;
        let max_edge = self.opts.preview_max_edge.max(1);
        let s = self.session.as_mut()?;
        if !s.stale || now.saturating_duration_since(s.edited_at) < debounce {
            return None;
        }
        if original.dimensions() != (s.image_w, s.image_h) {
            return None;
        }

        let r = s.rect;
        let cropped = match original.crop(r.x, r.y, r.width, r.height) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "crop preview failed");
                return None;
            }
        };
        let preview = downscale_to_edge(&cropped, max_edge);
        s.stale = false;
        s.preview = Some(preview.clone());
        Some(preview)
    }

    /// Last preview built by [`CropTool::poll_preview`].
    pub fn preview(&self) -> Option<&Raster> {
        self.session.as_ref().and_then(|s| s.preview.as_ref())
    }

    fn active_mut(&mut self) -> PosterResult<&mut CropSession> {
        self.session
            .as_mut()
            .ok_or_else(|| PosterError::validation("no active crop session"))
    }
}

impl CropSession {
    fn mark_edited(&mut self) {
        self.edited_at = Instant::now();
        self.stale = true;
    }
}

fn clamp_rect(prev: CropRect, patch: CropRectPatch, img_w: u32, img_h: u32, min: u32) -> CropRect {
    fn pick(v: Option<f64>, prev: u32) -> f64 {
        v.filter(|v| v.is_finite())
            .map(f64::round)
            .unwrap_or(f64::from(prev))
    }

    let min_w = f64::from(min.min(img_w));
    let min_h = f64::from(min.min(img_h));
    let width = pick(patch.width, prev.width).clamp(min_w, f64::from(img_w));
    let height = pick(patch.height, prev.height).clamp(min_h, f64::from(img_h));
    let x = pick(patch.x, prev.x).clamp(0.0, f64::from(img_w) - width);
    let y = pick(patch.y, prev.y).clamp(0.0, f64::from(img_h) - height);

    CropRect {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    }
}

fn preset_rect(preset: CropPreset, img_w: u32, img_h: u32, min: u32) -> CropRect {
    let (rw, rh) = preset.ratio();
    let (w, h) = if u64::from(img_w) * u64::from(rh) >= u64::from(img_h) * u64::from(rw) {
        let w = (f64::from(img_h) * f64::from(rw) / f64::from(rh)).round() as u32;
        (w, img_h)
    } else {
        let h = (f64::from(img_w) * f64::from(rh) / f64::from(rw)).round() as u32;
        (img_w, h)
    };
    let w = w.clamp(min.min(img_w), img_w);
    let h = h.clamp(min.min(img_h), img_h);
    CropRect {
        x: (img_w - w) / 2,
        y: (img_h - h) / 2,
        width: w,
        height: h,
    }
}

fn downscale_to_edge(src: &Raster, max_edge: u32) -> Raster {
    let (w, h) = src.dimensions();
    let long = w.max(h);
    if long <= max_edge {
        return src.clone();
    }
    let scale = f64::from(max_edge) / f64::from(long);
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    Raster::new(imageops::resize(src.as_image(), nw, nh, FilterType::Triangle))
}

#[cfg(test)]
#[path = "../../tests/unit/crop/tool.rs"]
mod tests;
