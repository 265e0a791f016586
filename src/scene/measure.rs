use crate::foundation::core::Size;
use crate::scene::layer::TextLayer;

/// Unscaled size of a layer's text box, used for hit testing and handles.
pub trait TextMeasure {
    /// Box size before the layer's scale and rotation are applied.
    fn measure(&self, layer: &TextLayer) -> Size;
}

/// Font-free estimate: every glyph is `0.6 em` wide.
///
/// Deterministic and cheap; the CPU renderer implements [`TextMeasure`] with real shaping.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimateMeasure;

impl TextMeasure for EstimateMeasure {
    fn measure(&self, layer: &TextLayer) -> Size {
        let size = layer.font_size.max(1.0);
        let lines: Vec<&str> = layer.text.split('\n').collect();
        let widest = lines
            .iter()
            .map(|l| {
                let n = l.chars().count() as f64;
                n * size * 0.6 + (n - 1.0).max(0.0) * layer.letter_spacing
            })
            .fold(0.0f64, f64::max);
        Size::new(
            widest.max(size * 0.5),
            lines.len() as f64 * size * layer.line_height.max(0.1),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/measure.rs"]
mod tests;
