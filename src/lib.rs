//! Posterkit is a poster composition engine: editable text layers over a raster background,
//! flattened to PNG at fixed social-media sizes.
//!
//! The public API is session-oriented:
//!
//! - Create an [`EditorSession`] for a platform from the [`PlatformRegistry`]
//! - Load a background, crop it with the crop tool, and add or transform [`TextLayer`]s
//! - Render previews with [`EditorSession::preview`]
//! - Export through an [`ExportJob`], which snapshots the scene when it starts
//!
//! The lower-level pieces ([`LanczosResampler`], [`Scene`], [`Controller`], [`CpuRenderer`]) are
//! usable on their own.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod crop;
mod export;
mod foundation;
mod imaging;
mod interact;
mod platform;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{
    Affine, Canvas, LayerId, Point, Rect, Rgba8Premul, Size, Vec2, normalize_degrees,
};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::assets::color::Color;
pub use crate::assets::decode::{decode_image, load_image_file};
pub use crate::assets::fonts::{FontBook, FontFace};
pub use crate::assets::raster::Raster;
pub use crate::config::EditorOpts;
pub use crate::crop::tool::{CropOpts, CropPreset, CropRect, CropRectPatch, CropTool};
pub use crate::export::artifact::{ExportArtifact, encode_png, export_file_name, slugify};
pub use crate::export::compose::{
    EMPTY_BACKGROUND, background_op, compose, render, scale_for_display,
};
pub use crate::export::job::{ExportJob, ExportOutcome, SaveListener};
pub use crate::export::store::{ArtifactStore, DirStore, InMemoryStore};
pub use crate::imaging::resample::{
    CropWindow, Fitted, LanczosResampler, Resampler, Sharpening, center_crop_window,
    cover_transform, fit_or_degrade,
};
pub use crate::interact::controller::{Controller, InteractOpts};
pub use crate::interact::event::{Action, InputEvent, Key, Modifiers};
pub use crate::interact::overlay::{SelectionOverlay, selection_overlay};
pub use crate::platform::registry::{DEFAULT_PLATFORM, PlatformRegistry, PlatformSize};
pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::plan::{BackgroundOp, RenderPlan};
pub use crate::scene::doc::PosterDoc;
pub use crate::scene::geometry::{
    Corner, Handle, angle_from_up, bounds, contains, corners, handles, layer_transform, up_vector,
};
pub use crate::scene::layer::{
    FontStyle, LayerGeometry, LayerPatch, LayerPreset, MAX_SHADOW_BLUR, Shadow, TextAlign,
    TextDecoration, TextLayer,
};
pub use crate::scene::measure::{EstimateMeasure, TextMeasure};
pub use crate::scene::model::{Campaign, Scene, Selection};
pub use crate::session::background::{BackgroundSource, ResizeRequest, ResizeResult};
pub use crate::session::editor::{BackgroundStatus, EditorSession};
pub use crate::session::loader::{FsLoader, ImageLoader, load_raster};
pub use crate::session::placeholder::{PLACEHOLDER_FILL, placeholder_raster};
