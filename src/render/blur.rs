use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};
use crate::scene::layer::MAX_SHADOW_BLUR;

const ONE_Q16: u32 = 1 << 16;

/// Gaussian blur for drop shadows, with a Q16 fixed-point kernel so output is bit-exact
/// across machines.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShadowBlur {
    kernel: Vec<u32>,
}

impl ShadowBlur {
    /// Kernel for a CSS-style blur length (sigma = blur / 2), clamped to [`MAX_SHADOW_BLUR`].
    /// `None` when nothing would blur.
    pub(crate) fn for_length(blur: f64) -> Option<Self> {
        if !blur.is_finite() || blur <= 0.0 {
            return None;
        }
        let sigma = (blur.min(MAX_SHADOW_BLUR) / 2.0).max(0.5);
        let radius = (sigma * 3.0).ceil() as i32;
        let weights: Vec<f64> = (-radius..=radius)
            .map(|i| (-f64::from(i).powi(2) / (2.0 * sigma * sigma)).exp())
            .collect();
        let sum: f64 = weights.iter().sum();

        let mut kernel: Vec<u32> = weights
            .iter()
            .map(|w| (w / sum * f64::from(ONE_Q16)).round() as u32)
            .collect();
        // Rounding drift goes to the center tap so the kernel sums to exactly one.
        let total: u32 = kernel.iter().sum();
        let mid = kernel.len() / 2;
        kernel[mid] = (kernel[mid] + ONE_Q16).saturating_sub(total);
        Some(Self { kernel })
    }

    pub(crate) fn radius(&self) -> usize {
        self.kernel.len() / 2
    }

    /// Blur a premultiplied RGBA8 surface; edges are clamped.
    pub(crate) fn apply(&self, src: &[u8], canvas: Canvas) -> PosterResult<Vec<u8>> {
        if src.len() != canvas.rgba_len() {
            return Err(PosterError::render(format!(
                "shadow surface is {} bytes, expected {} for {}x{}",
                src.len(),
                canvas.rgba_len(),
                canvas.width,
                canvas.height
            )));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Ok(src.to_vec());
        }
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        let mut tmp = vec![0u8; src.len()];
        let mut out = vec![0u8; src.len()];
        self.pass(src, &mut tmp, w, h, true);
        self.pass(&tmp, &mut out, w, h, false);
        Ok(out)
    }

    fn pass(&self, src: &[u8], dst: &mut [u8], w: usize, h: usize, horizontal: bool) {
        let r = self.radius() as isize;
        for y in 0..h {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (k, &weight) in self.kernel.iter().enumerate() {
                    let d = k as isize - r;
                    let (sx, sy) = if horizontal {
                        ((x as isize + d).clamp(0, w as isize - 1) as usize, y)
                    } else {
                        (x, (y as isize + d).clamp(0, h as isize - 1) as usize)
                    };
                    let px = &src[(sy * w + sx) * 4..][..4];
                    for (a, &c) in acc.iter_mut().zip(px) {
                        *a += u64::from(weight) * u64::from(c);
                    }
                }
                let out = &mut dst[(y * w + x) * 4..][..4];
                for (o, a) in out.iter_mut().zip(acc) {
                    *o = ((a + 0x8000) >> 16).min(255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
