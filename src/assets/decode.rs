use std::path::Path;

use anyhow::Context;

use crate::assets::raster::Raster;
use crate::foundation::error::{PosterError, PosterResult};

/// Decode encoded image bytes (PNG, JPEG, ...) into a straight-alpha raster.
pub fn decode_image(bytes: &[u8]) -> PosterResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PosterError::image_decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(PosterError::image_decode("decoded image has zero area"));
    }
    Ok(Raster::new(rgba))
}

/// Read and decode an image file from disk.
pub fn load_image_file(path: impl AsRef<Path>) -> PosterResult<Raster> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))
        .map_err(|e| PosterError::image_decode(format!("{e:#}")))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
