use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::raster::Raster;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::backend::FrameRGBA;

/// Flattened export, ready for download or persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested download name, `<campaign-slug>-<platform-key>.png`.
    pub file_name: String,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ExportArtifact {
    /// Encode `frame` as PNG under `file_name`.
    pub fn from_frame(frame: &FrameRGBA, file_name: impl Into<String>) -> PosterResult<Self> {
        Ok(Self {
            file_name: file_name.into(),
            png: encode_png(frame)?,
            width: frame.width,
            height: frame.height,
        })
    }

    /// Write the PNG into `dir` under [`ExportArtifact::file_name`], creating `dir` if needed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> PosterResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.png)
            .with_context(|| format!("write '{}'", path.display()))?;
        Ok(path)
    }

    /// Decode the PNG back into pixels.
    pub fn decode(&self) -> PosterResult<Raster> {
        crate::assets::decode::decode_image(&self.png)
    }
}

/// Encode a frame as a straight-alpha RGBA PNG.
pub fn encode_png(frame: &FrameRGBA) -> PosterResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba())
        .ok_or_else(|| PosterError::validation("frame buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode PNG")?;
    Ok(out)
}

/// Download name for a campaign/platform pair.
pub fn export_file_name(campaign: &str, platform: &str) -> String {
    format!("{}-{}.png", slugify(campaign, "poster"), slugify(platform, "canvas"))
}

/// Lowercase ASCII slug; runs of other characters collapse to one `-`.
pub fn slugify(s: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        fallback.to_owned()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/artifact.rs"]
mod tests;
