use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// Directory depth scanned below each font root.
const MAX_FONT_DIR_DEPTH: usize = 4;

/// One registered font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Family name as reported by the font.
    pub family: String,
    /// Weight on the CSS 1..1000 scale.
    pub weight: f32,
    /// Whether the face is italic/oblique.
    pub italic: bool,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

/// Index of font faces available to the text renderer.
///
/// Faces are resolved by family name first, then by closest weight and matching style. Unknown
/// families fall back to the first registered family.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    /// Empty font book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Font book populated from `dirs` followed by the usual system font locations.
    pub fn discover(dirs: &[PathBuf]) -> Self {
        let mut book = Self::new();
        for dir in dirs.iter().cloned().chain(system_font_dirs()) {
            book.load_dir(&dir);
        }
        tracing::debug!(faces = book.faces.len(), "font discovery finished");
        book
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Return `true` when no face is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Borrow a face by its registration index.
    pub fn face(&self, idx: usize) -> Option<&FontFace> {
        self.faces.get(idx)
    }

    /// All registered faces in registration order.
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Register every face contained in `bytes`. Returns the number of faces added.
    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) -> PosterResult<usize> {
        let data = Arc::new(bytes);
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(data.as_ref().clone()), None);
        if families.is_empty() {
            return Err(PosterError::validation(
                "no font families registered from font bytes",
            ));
        }

        let mut added = 0;
        for (family_id, infos) in families {
            let Some(family) = font_ctx.collection.family_name(family_id) else {
                continue;
            };
            let family = family.to_owned();
            for info in infos {
                self.faces.push(FontFace {
                    family: family.clone(),
                    weight: info.weight().value(),
                    italic: !matches!(info.style(), parley::fontique::FontStyle::Normal),
                    data: data.clone(),
                    index: info.index(),
                });
                added += 1;
            }
        }
        Ok(added)
    }

    /// Register a font file from disk.
    pub fn add_font_file(&mut self, path: impl AsRef<Path>) -> PosterResult<usize> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.add_font_bytes(bytes)
    }

    /// Register every `.ttf`/`.otf`/`.ttc` below `dir`. Unreadable files are skipped.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let mut files = Vec::new();
        collect_font_files(dir, 0, &mut files);
        files.sort();

        let mut added = 0;
        for path in files {
            match self.add_font_file(&path) {
                Ok(n) => added += n,
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping font"),
            }
        }
        added
    }

    /// Resolve a family/weight/style request to a face index.
    pub fn resolve(&self, family: &str, weight: f32, italic: bool) -> Option<usize> {
        let wanted = family.trim();
        let in_family: Vec<usize> = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.family.eq_ignore_ascii_case(wanted))
            .map(|(i, _)| i)
            .collect();

        let candidates = if in_family.is_empty() {
            let fallback = &self.faces.first()?.family;
            self.faces
                .iter()
                .enumerate()
                .filter(|(_, f)| &f.family == fallback)
                .map(|(i, _)| i)
                .collect()
        } else {
            in_family
        };

        candidates.into_iter().min_by(|&a, &b| {
            let score = |i: usize| {
                let f = &self.faces[i];
                let style_penalty = if f.italic == italic { 0.0 } else { 1000.0 };
                (f.weight - weight).abs() + style_penalty
            };
            score(a).total_cmp(&score(b)).then(a.cmp(&b))
        })
    }
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_FONT_DIR_DEPTH {
        return;
    }
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, depth + 1, out);
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext == "ttf" || ext == "otf" || ext == "ttc" {
            out.push(path);
        }
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
