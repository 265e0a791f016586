use crate::foundation::error::PosterResult;
use crate::render::plan::RenderPlan;
use crate::scene::measure::TextMeasure;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha; the flag keeps that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.premultiplied {
            crate::assets::raster::unpremultiply_rgba8_in_place(&mut data);
        }
        data
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(self.data.get(i..i + 4)?);
        if self.premultiplied {
            crate::assets::raster::unpremultiply_rgba8_in_place(&mut px);
        }
        Some(px)
    }
}

/// A renderer that executes a [`RenderPlan`] and measures text the same way it draws it.
pub trait RenderBackend: TextMeasure + Send {
    /// Draw the plan into a canvas-sized frame.
    fn render_plan(&mut self, plan: &RenderPlan) -> PosterResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
