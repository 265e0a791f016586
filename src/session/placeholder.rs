use crate::assets::color::Color;
use crate::assets::raster::Raster;
use crate::foundation::core::{Canvas, LayerId};
use crate::render::backend::RenderBackend;
use crate::render::plan::{BackgroundOp, RenderPlan};
use crate::scene::layer::TextLayer;

/// Neutral fill behind the diagnostic text.
pub const PLACEHOLDER_FILL: Color = Color::rgb(0x9C, 0xA3, 0xAF);

const MAX_DIAGNOSTIC_CHARS: usize = 72;

/// Canvas-sized stand-in background with `diagnostic` drawn in the middle.
///
/// Without usable fonts the result is a plain fill.
pub fn placeholder_raster(
    backend: &mut dyn RenderBackend,
    canvas: Canvas,
    diagnostic: &str,
) -> Raster {
    let plain = || Raster::solid(canvas.width, canvas.height, PLACEHOLDER_FILL.to_array());

    let mut detail: String = diagnostic.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
    if diagnostic.chars().count() > MAX_DIAGNOSTIC_CHARS {
        detail.push_str("...");
    }
    let center = canvas.center();
    let font_size = (f64::from(canvas.width) / 28.0).clamp(12.0, 48.0);
    let layer = TextLayer {
        id: LayerId(0),
        x: center.x,
        y: center.y,
        text: format!("Background unavailable\n{detail}"),
        font_size,
        fill: Color::rgb(0x1F, 0x29, 0x37),
        ..TextLayer::default()
    };
    let plan = RenderPlan {
        canvas,
        background: BackgroundOp::Solid(PLACEHOLDER_FILL),
        layers: vec![layer],
        overlay: None,
    };

    match backend.render_plan(&plan) {
        Ok(frame) => Raster::from_rgba8(frame.width, frame.height, frame.to_straight_rgba())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "placeholder frame unusable");
                plain()
            }),
        Err(e) => {
            tracing::warn!(error = %e, "placeholder text not drawn");
            plain()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/placeholder.rs"]
mod tests;
