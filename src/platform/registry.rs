use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};

/// Key of the platform selected when nothing else is configured.
pub const DEFAULT_PLATFORM: &str = "instagram_square";

const BUILTIN: &[(&str, &str, u32, u32)] = &[
    ("instagram_square", "Instagram Post (Square)", 1080, 1080),
    ("instagram_portrait", "Instagram Post (Portrait)", 1080, 1350),
    ("instagram_story", "Instagram Story", 1080, 1920),
    ("facebook_post", "Facebook Post", 1200, 630),
    ("twitter_post", "Twitter/X Post", 1600, 900),
    ("linkedin_post", "LinkedIn Post", 1200, 627),
    ("youtube_thumbnail", "YouTube Thumbnail", 1280, 720),
    ("pinterest_pin", "Pinterest Pin", 1000, 1500),
];

/// Named output resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSize {
    /// Registry key, e.g. `instagram_story`.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl PlatformSize {
    /// Output size as a canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }
}

/// Table of platform keys and their output dimensions.
///
/// Lookup order is registration order, which is also the listing order.
#[derive(Clone, Debug)]
pub struct PlatformRegistry {
    sizes: Vec<PlatformSize>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformRegistry {
    /// Registry holding the built-in social-media sizes.
    pub fn builtin() -> Self {
        let sizes = BUILTIN
            .iter()
            .map(|&(key, label, width, height)| PlatformSize {
                key: key.to_owned(),
                label: label.to_owned(),
                width,
                height,
            })
            .collect();
        Self { sizes }
    }

    /// Resolve a platform key to its output dimensions.
    pub fn size_of(&self, key: &str) -> PosterResult<Canvas> {
        self.get(key).map(PlatformSize::canvas)
    }

    /// Resolve a platform key to its full entry.
    pub fn get(&self, key: &str) -> PosterResult<&PlatformSize> {
        self.sizes
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| PosterError::UnknownPlatform(key.to_owned()))
    }

    /// Return `true` if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.sizes.iter().any(|s| s.key == key)
    }

    /// Add or replace an entry. Zero-area sizes are rejected.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        width: u32,
        height: u32,
    ) -> PosterResult<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(PosterError::validation("platform key must be non-empty"));
        }
        if width == 0 || height == 0 {
            return Err(PosterError::validation(format!(
                "platform '{key}' must have width/height > 0"
            )));
        }
        let entry = PlatformSize {
            key,
            label: label.into(),
            width,
            height,
        };
        match self.sizes.iter_mut().find(|s| s.key == entry.key) {
            Some(slot) => *slot = entry,
            None => self.sizes.push(entry),
        }
        Ok(())
    }

    /// All entries in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformSize> {
        self.sizes.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/platform/registry.rs"]
mod tests;
