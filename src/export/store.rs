use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// Persistence collaborator that turns an exported PNG into a stable URL.
pub trait ArtifactStore: Send + Sync {
    /// Store `png` under `name` and return its URL.
    fn persist(&self, name: &str, png: &[u8]) -> PosterResult<String>;
}

/// Store that writes files below a directory and hands out `file://` URLs.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Store rooted at `root`. The directory is created on first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for DirStore {
    fn persist(&self, name: &str, png: &[u8]) -> PosterResult<String> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PosterError::validation(format!(
                "artifact name '{name}' must be a plain file name"
            )));
        }
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create store dir '{}'", self.root.display()))?;
        let path = self.root.join(name);
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        let abs = std::path::absolute(&path)
            .with_context(|| format!("resolve '{}'", path.display()))?;
        Ok(format!("file://{}", abs.display()))
    }
}

/// In-memory store for tests and embedding. Can be told to fail.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    failure: Option<String>,
}

impl InMemoryStore {
    /// Empty store that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every artifact with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            saved: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    /// Snapshot of stored `(name, png)` pairs in arrival order.
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ArtifactStore for InMemoryStore {
    fn persist(&self, name: &str, png: &[u8]) -> PosterResult<String> {
        if let Some(msg) = &self.failure {
            return Err(PosterError::Other(anyhow::anyhow!("{msg}")));
        }
        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        saved.push((name.to_owned(), png.to_vec()));
        Ok(format!("mem://{}/{name}", saved.len()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/store.rs"]
mod tests;
