use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::assets::raster::Raster;
use crate::config::EditorOpts;
use crate::crop::tool::{CropPreset, CropRect, CropRectPatch, CropTool};
use crate::export::artifact::ExportArtifact;
use crate::export::compose::{background_op, render, scale_for_display};
use crate::export::job::{ExportJob, ExportOutcome, SaveListener};
use crate::export::store::ArtifactStore;
use crate::foundation::core::{Canvas, LayerId};
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::Fnv1a64;
use crate::imaging::resample::{LanczosResampler, Resampler};
use crate::interact::controller::Controller;
use crate::interact::event::{Action, InputEvent};
use crate::platform::registry::PlatformRegistry;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::RenderPlan;
use crate::scene::doc::PosterDoc;
use crate::scene::layer::{LayerPatch, LayerPreset, TextLayer};
use crate::scene::model::{Campaign, Scene, Selection};
use crate::session::background::{BackgroundSource, ResizeRequest, ResizeResult};
use crate::session::loader::{FsLoader, ImageLoader, load_raster};
use crate::session::placeholder::placeholder_raster;

/// How a background load ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundStatus {
    /// The image decoded and is now the original.
    Loaded,
    /// The image failed; a placeholder carrying this diagnostic took its place.
    Placeholder(String),
}

/// One poster being edited: the scene, its background, the crop tool and the chosen platform.
///
/// All edits go through the session. Exports and background resizes are split into owned job
/// values ([`ExportJob`], [`ResizeRequest`]) so they can finish elsewhere without seeing later
/// edits.
pub struct EditorSession {
    opts: EditorOpts,
    registry: PlatformRegistry,
    platform: String,
    canvas: Canvas,
    scene: Scene,
    background: BackgroundSource,
    crop: CropTool,
    controller: Controller,
    campaign: Campaign,
    gallery: Vec<String>,
    backend: Box<dyn RenderBackend>,
    resampler: Arc<dyn Resampler>,
    loader: Box<dyn ImageLoader>,
    on_save: Option<SaveListener>,
    preview_memo: Option<(u64, FrameRGBA)>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("platform", &self.platform)
            .field("canvas", &self.canvas)
            .field("layers", &self.scene.len())
            .field("selection", &self.scene.selection())
            .field("background_version", &self.background.version())
            .field("cropping", &self.crop.is_active())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Session on `opts.platform` with an empty scene and no background.
    ///
    /// Relative background paths resolve against the working directory until
    /// [`EditorSession::with_loader`] says otherwise.
    pub fn new(
        opts: EditorOpts,
        registry: PlatformRegistry,
        backend: Box<dyn RenderBackend>,
    ) -> PosterResult<Self> {
        let canvas = registry.size_of(&opts.platform)?;
        Ok(Self {
            platform: opts.platform.clone(),
            canvas,
            scene: Scene::new(),
            background: BackgroundSource::default(),
            crop: CropTool::new(opts.crop.clone()),
            controller: Controller::new(opts.interact.clone()),
            campaign: Campaign::default(),
            gallery: Vec::new(),
            backend,
            resampler: Arc::new(LanczosResampler::new(opts.sharpening)),
            loader: Box::new(FsLoader::new(".")),
            on_save: None,
            preview_memo: None,
            registry,
            opts,
        })
    }

    /// Replace the background loader.
    pub fn with_loader(mut self, loader: Box<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the resampler.
    pub fn with_resampler(mut self, resampler: Arc<dyn Resampler>) -> Self {
        self.resampler = resampler;
        self.background.invalidate_derived();
        self
    }

    /// Options in effect.
    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    /// Platform table.
    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Selected platform key.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Canvas of the selected platform.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Background state.
    pub fn background(&self) -> &BackgroundSource {
        &self.background
    }

    /// Crop tool state.
    pub fn crop(&self) -> &CropTool {
        &self.crop
    }

    /// Pointer controller state.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Campaign metadata.
    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Alternative background URLs.
    pub fn gallery(&self) -> &[String] {
        &self.gallery
    }

    /// Renderer used for previews, measurement and in-session exports.
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Replace campaign metadata.
    pub fn set_campaign(&mut self, campaign: Campaign) {
        self.campaign = campaign;
    }

    /// Listener called with the final URL after each successful save.
    pub fn set_on_save(&mut self, listener: Option<SaveListener>) {
        self.on_save = listener;
    }

    /// Switch the output platform. Layer geometry is left exactly as it is.
    pub fn set_platform(&mut self, key: &str) -> PosterResult<()> {
        let canvas = self.registry.size_of(key)?;
        if key != self.platform {
            tracing::debug!(from = %self.platform, to = %key, "platform changed");
            self.platform = key.to_owned();
            self.canvas = canvas;
            self.background.invalidate_derived();
        }
        Ok(())
    }

    // Background.

    /// Fetch and decode `url` as the new original.
    ///
    /// A failed load installs a canvas-sized placeholder carrying the diagnostic, so the session
    /// stays usable. Any open crop is cancelled either way.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn load_background(&mut self, url: &str) -> BackgroundStatus {
        let loaded = load_raster(self.loader.as_ref(), url);
        self.install_background(url, loaded)
    }

    /// Use an already decoded raster as the new original.
    pub fn set_background(&mut self, raster: Raster) {
        self.crop.cancel();
        self.background.replace(raster, None, None);
    }

    /// Replace the list of alternative backgrounds.
    pub fn set_gallery(&mut self, urls: Vec<String>) {
        self.gallery = urls;
    }

    /// Load the gallery entry at `index`.
    pub fn select_background(&mut self, index: usize) -> PosterResult<BackgroundStatus> {
        let url = self.gallery.get(index).cloned().ok_or_else(|| {
            PosterError::validation(format!(
                "gallery index {index} out of range ({} entries)",
                self.gallery.len()
            ))
        })?;
        Ok(self.load_background(&url))
    }

    /// Detached resize of the current original for the current platform.
    pub fn request_resize(&self) -> Option<ResizeRequest> {
        self.background
            .request(&self.platform, self.canvas, self.resampler.clone())
    }

    /// Cache a finished resize. Results for an older background or another platform are dropped.
    pub fn apply_resize(&mut self, result: ResizeResult) -> bool {
        self.background.accept(result, &self.platform)
    }

    /// Make sure the platform-sized background is cached, resizing inline if needed.
    ///
    /// Returns `false` when there is no background or the resampler degraded.
    pub fn refresh_derived(&mut self) -> bool {
        if self.background.derived_for(&self.platform).is_some() {
            return true;
        }
        match self.request_resize() {
            Some(req) => self.apply_resize(req.run()),
            None => false,
        }
    }

    // Crop.

    /// Open a crop session on the original background.
    pub fn start_crop(&mut self) -> PosterResult<CropRect> {
        let (w, h) = self
            .background
            .original()
            .map(Raster::dimensions)
            .ok_or_else(|| PosterError::validation("no background to crop"))?;
        self.crop.start(w, h)
    }

    /// Merge a partial rectangle into the open crop.
    pub fn update_crop(&mut self, patch: CropRectPatch) -> PosterResult<CropRect> {
        self.crop.update_rect(patch)
    }

    /// Snap the open crop to a preset ratio.
    pub fn apply_crop_preset(&mut self, preset: CropPreset) -> PosterResult<CropRect> {
        self.crop.apply_preset(preset)
    }

    /// Debounced crop preview; see [`CropTool::poll_preview`].
    pub fn poll_crop_preview(&mut self, now: Instant) -> Option<Raster> {
        let original = self.background.original()?;
        self.crop.poll_preview(original, now)
    }

    /// Replace the original with the cropped region.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn commit_crop(&mut self) -> PosterResult<CropRect> {
        let rect = self
            .crop
            .rect()
            .ok_or_else(|| PosterError::validation("no active crop session"))?;
        let original = self
            .background
            .original()
            .ok_or_else(|| PosterError::validation("no background to crop"))?;
        let cropped = self.crop.commit(original)?;
        let url = self.background.url().map(str::to_owned);
        self.background.replace(cropped, url, None);
        Ok(rect)
    }

    /// Close the crop session without changes.
    pub fn cancel_crop(&mut self) -> bool {
        self.crop.cancel()
    }

    // Scene.

    /// Add a preset layer centered on the current canvas and select it.
    pub fn add_layer(&mut self, preset: LayerPreset) -> LayerId {
        let id = self
            .scene
            .add_layer(preset, self.canvas, Some(&self.campaign));
        self.select_quietly(id);
        id
    }

    /// Merge a partial update into a layer.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> PosterResult<()> {
        self.scene.update_layer(id, patch)
    }

    /// Remove a layer. Deleting the selected layer clears the selection.
    pub fn delete_layer(&mut self, id: LayerId) -> PosterResult<TextLayer> {
        self.scene.delete_layer(id)
    }

    /// Copy a layer with the configured offset and select the copy.
    pub fn duplicate_layer(&mut self, id: LayerId) -> PosterResult<LayerId> {
        let copy = self.scene.duplicate_layer(id, self.opts.duplicate_offset)?;
        self.select_quietly(copy);
        Ok(copy)
    }

    /// Show or hide a layer.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> PosterResult<()> {
        self.scene.set_visible(id, visible)
    }

    /// Select a layer or clear the selection.
    pub fn select(&mut self, id: Option<LayerId>) -> PosterResult<()> {
        self.scene.select(id)
    }

    /// Open a layer's text for editing.
    pub fn enter_edit_mode(&mut self, id: LayerId) -> PosterResult<()> {
        self.scene.enter_edit_mode(id)
    }

    /// Close text editing.
    pub fn exit_edit_mode(&mut self) -> bool {
        self.scene.exit_edit_mode()
    }

    /// Move a layer to `index` in draw order.
    pub fn reorder_layer(&mut self, id: LayerId, index: usize) -> PosterResult<()> {
        self.scene.reorder_layer(id, index)
    }

    /// Draw a layer one step later.
    pub fn bring_forward(&mut self, id: LayerId) -> PosterResult<()> {
        self.scene.bring_forward(id)
    }

    /// Draw a layer one step earlier.
    pub fn send_backward(&mut self, id: LayerId) -> PosterResult<()> {
        self.scene.send_backward(id)
    }

    /// Load a poster document: platform, campaign, background, crop and layers.
    ///
    /// Relative background paths resolve against `root`.
    pub fn apply_doc(&mut self, doc: &PosterDoc, root: &Path) -> PosterResult<Vec<LayerId>> {
        doc.validate(&self.registry)?;
        self.set_platform(&doc.platform)?;
        self.campaign = doc.campaign.clone();
        if let Some(url) = &doc.background {
            let loaded = load_raster(&FsLoader::new(root), url);
            if let BackgroundStatus::Placeholder(reason) = self.install_background(url, loaded) {
                tracing::warn!(%reason, "document background replaced by placeholder");
            } else if let Some(c) = doc.crop {
                self.start_crop()?;
                self.update_crop(CropRectPatch {
                    x: Some(f64::from(c.x)),
                    y: Some(f64::from(c.y)),
                    width: Some(f64::from(c.width)),
                    height: Some(f64::from(c.height)),
                })?;
                self.commit_crop()?;
            }
        }
        Ok(self.scene.insert_layers(doc.layers.iter().cloned()))
    }

    // Interaction.

    /// Feed one pointer or key event to the controller.
    pub fn handle_event(&mut self, event: InputEvent) -> Action {
        self.controller
            .handle_event(&mut self.scene, &*self.backend, event)
    }

    /// Replace the text of the layer being edited.
    pub fn input_text(&mut self, text: &str) -> PosterResult<Action> {
        self.controller.input_text(&mut self.scene, text)
    }

    // Output.

    /// Render what the user sees: the export pixels plus the selection overlay, shrunk by `zoom`.
    ///
    /// The frame is always composed at full canvas resolution first. Identical requests reuse
    /// the previous frame.
    pub fn preview(&mut self, zoom: f64) -> PosterResult<FrameRGBA> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(PosterError::validation("preview zoom must be finite and > 0"));
        }
        self.refresh_derived();

        let key = self.preview_key(zoom);
        if let (Some(k), Some((memo_key, frame))) = (key, &self.preview_memo)
            && k == *memo_key
        {
            return Ok(frame.clone());
        }

        let overlay = self.controller.overlay(&self.scene, &*self.backend);
        let plan = RenderPlan {
            canvas: self.canvas,
            background: background_op(
                self.resampler.as_ref(),
                self.background.original(),
                self.background.derived_for(&self.platform),
                self.canvas,
            ),
            layers: self.scene.snapshot(),
            overlay,
        };
        let frame = scale_for_display(render(self.backend.as_mut(), &plan)?, zoom)?;
        self.preview_memo = key.map(|k| (k, frame.clone()));
        Ok(frame)
    }

    /// Snapshot the current state into an export job.
    ///
    /// The selection stays as it is in the session; exports never draw its handles.
    pub fn begin_export(&self) -> ExportJob {
        let mut job = ExportJob::new(
            self.platform.clone(),
            self.canvas,
            self.scene.snapshot(),
            self.resampler.clone(),
        )
        .with_campaign(self.campaign.name.clone())
        .with_listener(self.on_save.clone());
        if let Some(original) = self.background.original() {
            job = job.with_background(
                original.clone(),
                self.background.derived_for(&self.platform).cloned(),
            );
        }
        tracing::debug!(?job, "export started");
        job
    }

    /// Compose the current state for local download, without persistence.
    pub fn download(&mut self) -> PosterResult<ExportArtifact> {
        self.refresh_derived();
        let job = self.begin_export();
        job.compose(self.backend.as_mut())
    }

    /// Compose, persist through `store` and notify the save listener.
    pub fn export(&mut self, store: &dyn ArtifactStore) -> PosterResult<ExportOutcome> {
        self.refresh_derived();
        let job = self.begin_export();
        job.run(self.backend.as_mut(), store)
    }

    fn install_background(&mut self, url: &str, loaded: PosterResult<Raster>) -> BackgroundStatus {
        self.crop.cancel();
        match loaded {
            Ok(raster) => {
                self.background.replace(raster, Some(url.to_owned()), None);
                BackgroundStatus::Loaded
            }
            Err(e) => {
                let diagnostic = e.to_string();
                tracing::warn!(
                    %url,
                    error = %diagnostic,
                    "background failed to load; using placeholder"
                );
                let raster = placeholder_raster(self.backend.as_mut(), self.canvas, &diagnostic);
                self.background
                    .replace(raster, Some(url.to_owned()), Some(diagnostic.clone()));
                BackgroundStatus::Placeholder(diagnostic)
            }
        }
    }

    fn select_quietly(&mut self, id: LayerId) {
        if let Err(e) = self.scene.select(Some(id)) {
            tracing::warn!(%id, error = %e, "could not select layer");
        }
    }

    fn preview_key(&self, zoom: f64) -> Option<u64> {
        let layers = serde_json::to_vec(self.scene.layers()).ok()?;
        let mut h = Fnv1a64::default();
        h.write_bytes(self.platform.as_bytes());
        h.write_u64(self.background.version());
        h.write_bytes(&layers);
        match self.scene.selection() {
            Selection::None => h.write_tag(0),
            Selection::Selected(id) => {
                h.write_tag(1);
                h.write_u64(id.0);
            }
            Selection::Editing(id) => {
                h.write_tag(2);
                h.write_u64(id.0);
            }
        }
        h.write_f64(zoom);
        Some(h.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
