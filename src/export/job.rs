use std::fmt;
use std::sync::Arc;

use crate::assets::raster::Raster;
use crate::export::artifact::{ExportArtifact, export_file_name};
use crate::export::compose::{background_op, render};
use crate::export::store::ArtifactStore;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PosterError, PosterResult};
use crate::imaging::resample::Resampler;
use crate::render::backend::RenderBackend;
use crate::render::plan::RenderPlan;
use crate::scene::layer::TextLayer;

/// Callback invoked with the persisted URL after a successful save.
pub type SaveListener = Arc<dyn Fn(&str) + Send + Sync>;

/// A successful export.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    /// What was persisted.
    pub artifact: ExportArtifact,
    /// URL returned by the store.
    pub url: String,
}

/// Everything an export needs, copied out of the session when the export starts.
///
/// Later scene edits cannot reach a job: it owns its layers and shares only immutable rasters.
/// Jobs are `Send` and may run on another thread with their own backend.
#[derive(Clone)]
pub struct ExportJob {
    platform: String,
    canvas: Canvas,
    campaign: String,
    layers: Vec<TextLayer>,
    background: Option<Raster>,
    derived: Option<Raster>,
    resampler: Arc<dyn Resampler>,
    on_save: Option<SaveListener>,
}

impl fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportJob")
            .field("platform", &self.platform)
            .field("canvas", &self.canvas)
            .field("campaign", &self.campaign)
            .field("layers", &self.layers.len())
            .field("background", &self.background.as_ref().map(Raster::dimensions))
            .field("derived", &self.derived.is_some())
            .finish_non_exhaustive()
    }
}

impl ExportJob {
    /// Job for `layers` on a `canvas` named `platform`.
    pub fn new(
        platform: impl Into<String>,
        canvas: Canvas,
        layers: Vec<TextLayer>,
        resampler: Arc<dyn Resampler>,
    ) -> Self {
        Self {
            platform: platform.into(),
            canvas,
            campaign: String::new(),
            layers,
            background: None,
            derived: None,
            resampler,
            on_save: None,
        }
    }

    /// Background original plus an optional already-fitted copy for this canvas.
    pub fn with_background(mut self, original: Raster, derived: Option<Raster>) -> Self {
        self.background = Some(original);
        self.derived = derived;
        self
    }

    /// Campaign name used in the download file name.
    pub fn with_campaign(mut self, name: impl Into<String>) -> Self {
        self.campaign = name.into();
        self
    }

    /// Listener called with the URL after a successful [`ExportJob::run`].
    pub fn with_listener(mut self, on_save: Option<SaveListener>) -> Self {
        self.on_save = on_save;
        self
    }

    /// Target platform key.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Target canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Layers captured at export start.
    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    /// Download name for this export.
    pub fn file_name(&self) -> String {
        export_file_name(&self.campaign, &self.platform)
    }

    /// Flatten the snapshot into a PNG artifact without persisting it.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(platform = %self.platform, layers = self.layers.len())
    )]
    pub fn compose(&self, backend: &mut dyn RenderBackend) -> PosterResult<ExportArtifact> {
        let plan = RenderPlan {
            canvas: self.canvas,
            background: background_op(
                self.resampler.as_ref(),
                self.background.as_ref(),
                self.derived.as_ref(),
                self.canvas,
            ),
            layers: self.layers.clone(),
            overlay: None,
        };
        let frame = render(backend, &plan)?;
        ExportArtifact::from_frame(&frame, self.file_name())
    }

    /// Compose, hand the PNG to `store` and notify the save listener.
    ///
    /// When the store fails the composed artifact is returned inside
    /// [`PosterError::ExportPersistence`].
    pub fn run(
        self,
        backend: &mut dyn RenderBackend,
        store: &dyn ArtifactStore,
    ) -> PosterResult<ExportOutcome> {
        let artifact = self.compose(backend)?;
        match store.persist(&artifact.file_name, &artifact.png) {
            Ok(url) => {
                tracing::info!(%url, file = %artifact.file_name, "export saved");
                if let Some(cb) = &self.on_save {
                    cb(&url);
                }
                Ok(ExportOutcome { artifact, url })
            }
            Err(e) => {
                tracing::warn!(error = %e, file = %artifact.file_name, "export persistence failed");
                Err(PosterError::ExportPersistence {
                    message: e.to_string(),
                    artifact: Box::new(artifact),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/job.rs"]
mod tests;
