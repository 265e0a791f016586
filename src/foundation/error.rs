use crate::export::artifact::ExportArtifact;
use crate::foundation::core::LayerId;

/// Convenience result type used across posterkit.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// The requested platform key is not registered.
    #[error("unknown platform: '{0}'")]
    UnknownPlatform(String),

    /// A background image could not be fetched or decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// A mutation referenced a layer id that is not (or no longer) in the scene.
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    /// The high-quality resampler could not produce an output.
    #[error("resample degraded: {0}")]
    ResampleDegraded(String),

    /// The persistence collaborator rejected the export.
    ///
    /// The composed artifact travels with the error so it can still be offered for download.
    #[error("export persistence error: {message}")]
    ExportPersistence {
        /// Diagnostic from the persistence collaborator.
        message: String,
        /// The locally composed artifact.
        artifact: Box<ExportArtifact>,
    },

    /// Invalid user-provided or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised while executing a render plan.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PosterError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`PosterError::ResampleDegraded`] value.
    pub fn resample_degraded(msg: impl Into<String>) -> Self {
        Self::ResampleDegraded(msg.into())
    }

    /// Return the retained artifact when this is a persistence failure.
    pub fn into_artifact(self) -> Option<ExportArtifact> {
        match self {
            Self::ExportPersistence { artifact, .. } => Some(*artifact),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
