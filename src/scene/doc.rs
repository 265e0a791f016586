use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crop::tool::CropRect;
use crate::foundation::error::{PosterError, PosterResult};
use crate::platform::registry::{DEFAULT_PLATFORM, PlatformRegistry};
use crate::scene::layer::{MAX_SHADOW_BLUR, TextLayer};
use crate::scene::model::Campaign;

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_owned()
}

/// JSON poster document: a platform, a background, campaign metadata and text layers.
///
/// Layer ids in the document are ignored; the scene assigns fresh ones on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PosterDoc {
    /// Target platform key.
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Background image path or `file://` URL, relative to the document.
    #[serde(default)]
    pub background: Option<String>,
    /// Crop applied to the background before fitting.
    #[serde(default)]
    pub crop: Option<CropRect>,
    /// Campaign metadata.
    #[serde(default)]
    pub campaign: Campaign,
    /// Text layers in draw order.
    #[serde(default)]
    pub layers: Vec<TextLayer>,
}

impl PosterDoc {
    /// Parse a document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PosterResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PosterError::validation(format!("parse poster JSON: {e}")))
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PosterError::validation(format!("open poster JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the platform key and layer values.
    pub fn validate(&self, registry: &PlatformRegistry) -> PosterResult<()> {
        registry.get(&self.platform)?;

        if let Some(c) = self.crop
            && (c.width == 0 || c.height == 0)
        {
            return Err(PosterError::validation("crop width/height must be > 0"));
        }

        for (i, l) in self.layers.iter().enumerate() {
            let bad = |what: &str| PosterError::validation(format!("layers[{i}]: {what}"));
            let numbers = [
                l.x,
                l.y,
                l.rotation_deg,
                l.scale_x,
                l.scale_y,
                l.font_size,
                l.stroke_width,
                l.letter_spacing,
                l.line_height,
                l.opacity,
                l.shadow.blur,
                l.shadow.offset_x,
                l.shadow.offset_y,
            ];
            if numbers.iter().any(|v| !v.is_finite()) {
                return Err(bad("numbers must be finite"));
            }
            if l.font_size <= 0.0 {
                return Err(bad("font_size must be > 0"));
            }
            if l.scale_x <= 0.0 || l.scale_y <= 0.0 {
                return Err(bad("scale must be > 0"));
            }
            if !(0.0..=1.0).contains(&l.opacity) {
                return Err(bad("opacity must be in [0, 1]"));
            }
            if l.stroke_width < 0.0 || l.shadow.blur < 0.0 {
                return Err(bad("stroke_width and shadow.blur must be >= 0"));
            }
            if l.shadow.blur > MAX_SHADOW_BLUR {
                return Err(bad(&format!("shadow.blur must be <= {MAX_SHADOW_BLUR}")));
            }
            if l.line_height <= 0.0 {
                return Err(bad("line_height must be > 0"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/doc.rs"]
mod tests;
