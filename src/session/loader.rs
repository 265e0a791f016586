use std::path::{Path, PathBuf};

use crate::assets::decode::decode_image;
use crate::assets::raster::Raster;
use crate::foundation::error::{PosterError, PosterResult};

/// Fetches encoded image bytes for a background URL.
pub trait ImageLoader: Send + Sync {
    /// Return the bytes behind `url`.
    fn fetch(&self, url: &str) -> PosterResult<Vec<u8>>;
}

/// Loader for `file://` URLs and plain paths. Relative paths resolve against a root directory.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Loader resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a URL or path onto the filesystem.
    pub fn resolve(&self, url: &str) -> PosterResult<PathBuf> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PosterError::image_decode("empty background URL"));
        }
        let raw = match url.strip_prefix("file://") {
            Some(rest) => rest,
            None if url.contains("://") => {
                return Err(PosterError::image_decode(format!(
                    "unsupported URL scheme in '{url}'"
                )));
            }
            None => url,
        };
        let path = Path::new(raw);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        })
    }
}

impl ImageLoader for FsLoader {
    fn fetch(&self, url: &str) -> PosterResult<Vec<u8>> {
        let path = self.resolve(url)?;
        std::fs::read(&path)
            .map_err(|e| PosterError::image_decode(format!("read '{}': {e}", path.display())))
    }
}

/// Fetch and decode in one step.
pub fn load_raster(loader: &dyn ImageLoader, url: &str) -> PosterResult<Raster> {
    decode_image(&loader.fetch(url)?)
}

#[cfg(test)]
#[path = "../../tests/unit/session/loader.rs"]
mod tests;
