use crate::foundation::core::{LayerId, Point};
use crate::scene::geometry::{self, Handle};
use crate::scene::measure::TextMeasure;
use crate::scene::model::Scene;

/// Outline and handles of the selected layer, in canvas pixels. Drawn in previews only.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionOverlay {
    /// Selected layer.
    pub layer: LayerId,
    /// Box corners, clockwise from top-left.
    pub corners: [Point; 4],
    /// Handle positions.
    pub handles: Vec<(Handle, Point)>,
    /// Handle radius in pixels.
    pub handle_radius: f64,
}

/// Overlay for the current selection, if the selected layer is visible.
pub fn selection_overlay(
    scene: &Scene,
    measure: &dyn TextMeasure,
    rotate_offset: f64,
    handle_radius: f64,
) -> Option<SelectionOverlay> {
    let layer = scene.layer(scene.selected()?)?;
    if !layer.visible {
        return None;
    }
    let size = measure.measure(layer);
    let g = layer.geometry();
    Some(SelectionOverlay {
        layer: layer.id,
        corners: geometry::corners(&g, size),
        handles: geometry::handles(&g, size, rotate_offset),
        handle_radius,
    })
}
