use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::crop::tool::CropOpts;
use crate::imaging::resample::Sharpening;
use crate::interact::controller::InteractOpts;
use crate::platform::registry::DEFAULT_PLATFORM;

/// Editor session configuration.
#[derive(Clone, Debug)]
pub struct EditorOpts {
    /// Platform selected when a session starts.
    pub platform: String,
    /// Crop tool tuning.
    pub crop: CropOpts,
    /// Pointer interaction tuning.
    pub interact: InteractOpts,
    /// Unsharp mask applied after resampling; `None` disables it.
    pub sharpening: Option<Sharpening>,
    /// Offset of a duplicated layer from its original, on both axes.
    pub duplicate_offset: f64,
    /// Extra font directories searched before the system ones.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_owned(),
            crop: CropOpts::default(),
            interact: InteractOpts::default(),
            sharpening: Some(Sharpening::default()),
            duplicate_offset: 20.0,
            font_dirs: Vec::new(),
        }
    }
}

impl EditorOpts {
    /// Defaults overridden by `POSTERKIT_*` environment variables.
    ///
    /// Unparsable or out-of-range values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        let num = |key: &str| {
            lookup(key)
                .and_then(|v| parse_trimmed::<f64>(&v))
                .filter(|v| v.is_finite())
        };
        let int = |key: &str| lookup(key).and_then(|v| parse_trimmed::<u64>(&v));

        if let Some(p) = lookup("POSTERKIT_PLATFORM")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
        {
            opts.platform = p;
        }
        if let Some(n) = int("POSTERKIT_CROP_MIN_SIZE").filter(|&n| n > 0) {
            opts.crop.min_size = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(ms) = int("POSTERKIT_CROP_DEBOUNCE_MS") {
            opts.crop.preview_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = int("POSTERKIT_DOUBLE_CLICK_MS").filter(|&n| n > 0) {
            opts.interact.double_click_ms = ms;
        }
        if let Some(px) = num("POSTERKIT_DUPLICATE_OFFSET") {
            opts.duplicate_offset = px;
        }
        if let Some(deg) = num("POSTERKIT_ROTATION_SNAP_DEG").filter(|&d| d > 0.0) {
            opts.interact.rotation_snap_deg = deg;
        }
        if let Some(sigma) = num("POSTERKIT_SHARPEN_SIGMA").filter(|&s| s >= 0.0) {
            opts.sharpening = (sigma > 0.0).then(|| Sharpening {
                sigma: sigma as f32,
                ..opts.sharpening.unwrap_or_default()
            });
        }
        if let Some(t) =
            lookup("POSTERKIT_SHARPEN_THRESHOLD").and_then(|v| parse_trimmed::<i32>(&v))
            && let Some(s) = opts.sharpening.as_mut()
        {
            s.threshold = t.max(0);
        }
        if let Some(dirs) = lookup("POSTERKIT_FONT_DIRS") {
            opts.font_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        opts
    }
}

fn parse_trimmed<T: FromStr>(v: &str) -> Option<T> {
    v.trim().parse().ok()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
