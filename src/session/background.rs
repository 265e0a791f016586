use std::fmt;
use std::sync::Arc;

use crate::assets::raster::Raster;
use crate::foundation::core::Canvas;
use crate::imaging::resample::{Fitted, Resampler, fit_or_degrade};

#[derive(Clone, Debug)]
struct Derived {
    platform: String,
    version: u64,
    raster: Raster,
}

/// The poster's base image.
///
/// The original is never edited in place; replacing it bumps [`BackgroundSource::version`] and
/// drops the platform-sized copy.
#[derive(Clone, Debug, Default)]
pub struct BackgroundSource {
    original: Option<Raster>,
    url: Option<String>,
    load_error: Option<String>,
    version: u64,
    derived: Option<Derived>,
}

impl BackgroundSource {
    /// Full-resolution original.
    pub fn original(&self) -> Option<&Raster> {
        self.original.as_ref()
    }

    /// Where the original came from, if it was loaded by URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Diagnostic for a background that fell back to the placeholder.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Identity of the current original; changes on every replacement.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Cached copy fitted for `platform`, if it belongs to the current original.
    pub fn derived_for(&self, platform: &str) -> Option<&Raster> {
        self.derived
            .as_ref()
            .filter(|d| d.version == self.version && d.platform == platform)
            .map(|d| &d.raster)
    }

    pub(crate) fn replace(&mut self, raster: Raster, url: Option<String>, load_error: Option<String>) {
        self.original = Some(raster);
        self.url = url;
        self.load_error = load_error;
        self.version += 1;
        self.derived = None;
        tracing::debug!(version = self.version, "background replaced");
    }

    pub(crate) fn invalidate_derived(&mut self) {
        if self.derived.take().is_some() {
            tracing::debug!(version = self.version, "derived background invalidated");
        }
    }

    pub(crate) fn request(
        &self,
        platform: &str,
        canvas: Canvas,
        resampler: Arc<dyn Resampler>,
    ) -> Option<ResizeRequest> {
        Some(ResizeRequest {
            version: self.version,
            platform: platform.to_owned(),
            canvas,
            source: self.original.clone()?,
            resampler,
        })
    }

    /// Store a finished resize if it still matches the current original and `platform`.
    pub(crate) fn accept(&mut self, result: ResizeResult, platform: &str) -> bool {
        if result.version != self.version || result.platform != platform {
            tracing::debug!(
                result_version = result.version,
                current_version = self.version,
                result_platform = %result.platform,
                current_platform = %platform,
                "discarding stale resize"
            );
            return false;
        }
        match result.fitted {
            Fitted::Exact(raster) => {
                self.derived = Some(Derived {
                    platform: result.platform,
                    version: result.version,
                    raster,
                });
                true
            }
            Fitted::Unscaled(_) => false,
        }
    }
}

/// A resize of the current original, detached from the session so it can run anywhere.
#[derive(Clone)]
pub struct ResizeRequest {
    version: u64,
    platform: String,
    canvas: Canvas,
    source: Raster,
    resampler: Arc<dyn Resampler>,
}

impl fmt::Debug for ResizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeRequest")
            .field("version", &self.version)
            .field("platform", &self.platform)
            .field("canvas", &self.canvas)
            .field("source", &self.source.dimensions())
            .finish_non_exhaustive()
    }
}

impl ResizeRequest {
    /// Background version the request was made for.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Platform the request was made for.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Target size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Resample. Failures degrade to the unscaled source.
    pub fn run(self) -> ResizeResult {
        let fitted = fit_or_degrade(self.resampler.as_ref(), &self.source, self.canvas);
        ResizeResult {
            version: self.version,
            platform: self.platform,
            fitted,
        }
    }
}

/// Output of [`ResizeRequest::run`], applied with `EditorSession::apply_resize`.
#[derive(Clone, Debug)]
pub struct ResizeResult {
    /// Background version the resize was computed from.
    pub version: u64,
    /// Platform the resize targets.
    pub platform: String,
    /// The fitted raster.
    pub fitted: Fitted,
}

#[cfg(test)]
#[path = "../../tests/unit/session/background.rs"]
mod tests;
