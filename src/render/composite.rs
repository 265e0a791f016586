use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::mul_255;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel, with the source scaled by `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let src = src.map(|c| mul_255(c, op));
    if src[3] == 0 {
        return dst;
    }
    let keep = 255 - src[3];
    std::array::from_fn(|i| src[i].saturating_add(mul_255(dst[i], keep)))
}

/// Layer surface composited onto the frame. Both buffers are premultiplied RGBA8.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> PosterResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PosterError::render(format!(
            "surface size mismatch: {} vs {} bytes",
            src.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub(crate) fn fill(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
