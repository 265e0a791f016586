use crate::assets::color::Color;
use crate::assets::raster::Raster;
use crate::foundation::core::Canvas;
use crate::imaging::resample::Fitted;
use crate::interact::overlay::SelectionOverlay;
use crate::scene::layer::TextLayer;

/// How the background reaches the canvas.
#[derive(Clone, Debug)]
pub enum BackgroundOp {
    /// Raster already at canvas size, copied as-is.
    Exact(Raster),
    /// Raster of any size, scaled to cover the canvas and centered.
    Cover(Raster),
    /// Flat color, used when there is no background.
    Solid(Color),
}

impl From<Fitted> for BackgroundOp {
    fn from(f: Fitted) -> Self {
        match f {
            Fitted::Exact(r) => BackgroundOp::Exact(r),
            Fitted::Unscaled(r) => BackgroundOp::Cover(r),
        }
    }
}

/// Everything a backend needs to draw one frame, owned so it can move across threads.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    /// Output size.
    pub canvas: Canvas,
    /// Base layer.
    pub background: BackgroundOp,
    /// Text layers in draw order; hidden layers are skipped.
    pub layers: Vec<TextLayer>,
    /// Selection outline, previews only.
    pub overlay: Option<SelectionOverlay>,
}
