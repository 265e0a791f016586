use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, LayerId};
use crate::foundation::error::{PosterError, PosterResult};
use crate::scene::layer::{LayerGeometry, LayerPatch, LayerPreset, TextLayer};

/// Campaign metadata supplied by the host application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    /// Campaign name; also the first part of export file names.
    pub name: String,
    /// Seed text for the call-to-action preset.
    #[serde(alias = "callToAction")]
    pub call_to_action: Option<String>,
}

/// Selection state. Editing a layer always implies it is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// One layer selected.
    Selected(LayerId),
    /// One layer selected with its text open for editing.
    Editing(LayerId),
}

impl Selection {
    /// Selected layer, editing or not.
    pub fn layer(self) -> Option<LayerId> {
        match self {
            Selection::None => None,
            Selection::Selected(id) | Selection::Editing(id) => Some(id),
        }
    }
}

/// Ordered text layers plus selection. Index 0 is drawn first.
#[derive(Clone, Debug)]
pub struct Scene {
    layers: Vec<TextLayer>,
    next_id: u64,
    selection: Selection,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            next_id: 1,
            selection: Selection::None,
        }
    }

    /// Layers in draw order.
    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` if the scene has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Borrow a layer.
    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selected layer id.
    pub fn selected(&self) -> Option<LayerId> {
        self.selection.layer()
    }

    /// Return `true` while a layer's text is being edited.
    pub fn is_editing(&self) -> bool {
        matches!(self.selection, Selection::Editing(_))
    }

    /// Owned copy of the layers, for work that must not observe later edits.
    pub fn snapshot(&self) -> Vec<TextLayer> {
        self.layers.clone()
    }

    /// Append a preset layer centered on `canvas`. Always succeeds.
    pub fn add_layer(
        &mut self,
        preset: LayerPreset,
        canvas: Canvas,
        campaign: Option<&Campaign>,
    ) -> LayerId {
        let text = match preset {
            LayerPreset::CallToAction => campaign
                .and_then(|c| c.call_to_action.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(preset.placeholder())
                .to_owned(),
            _ => preset.placeholder().to_owned(),
        };
        let center = canvas.center();
        let id = self.fresh_id();
        self.layers.push(TextLayer {
            id,
            x: center.x,
            y: center.y,
            text,
            font_size: preset.font_size(),
            font_weight: preset.font_weight(),
            ..TextLayer::default()
        });
        tracing::debug!(%id, ?preset, "layer added");
        id
    }

    /// Append already-built layers with fresh ids, e.g. from a document.
    pub fn insert_layers(&mut self, layers: impl IntoIterator<Item = TextLayer>) -> Vec<LayerId> {
        layers
            .into_iter()
            .map(|mut layer| {
                layer.id = self.fresh_id();
                layer.sanitize();
                let id = layer.id;
                self.layers.push(layer);
                id
            })
            .collect()
    }

    /// Merge `patch` into a layer.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> PosterResult<()> {
        let idx = self.index_of(id)?;
        self.layers[idx].apply(patch);
        Ok(())
    }

    /// Write position, rotation and scale in one step.
    pub fn set_geometry(&mut self, id: LayerId, geometry: LayerGeometry) -> PosterResult<()> {
        let idx = self.index_of(id)?;
        self.layers[idx].set_geometry(geometry);
        Ok(())
    }

    /// Remove a layer; clears the selection if it pointed at it.
    pub fn delete_layer(&mut self, id: LayerId) -> PosterResult<TextLayer> {
        let idx = self.index_of(id)?;
        let removed = self.layers.remove(idx);
        if self.selection.layer() == Some(id) {
            self.selection = Selection::None;
            tracing::debug!(%id, "selection cleared by delete");
        }
        Ok(removed)
    }

    /// Clone a layer with a fresh id, shifted by `offset` pixels on both axes, directly above the
    /// original in z-order.
    pub fn duplicate_layer(&mut self, id: LayerId, offset: f64) -> PosterResult<LayerId> {
        let idx = self.index_of(id)?;
        let mut copy = self.layers[idx].clone();
        copy.id = self.fresh_id();
        copy.x += offset;
        copy.y += offset;
        let new_id = copy.id;
        self.layers.insert(idx + 1, copy);
        tracing::debug!(from = %id, to = %new_id, "layer duplicated");
        Ok(new_id)
    }

    /// Show or hide a layer.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> PosterResult<()> {
        let idx = self.index_of(id)?;
        self.layers[idx].visible = visible;
        Ok(())
    }

    /// Select a layer, or clear the selection with `None`. Edit mode always ends.
    pub fn select(&mut self, id: Option<LayerId>) -> PosterResult<()> {
        let next = match id {
            Some(id) => {
                self.index_of(id)?;
                Selection::Selected(id)
            }
            None => Selection::None,
        };
        if next != self.selection {
            tracing::debug!(from = ?self.selection, to = ?next, "selection changed");
        }
        self.selection = next;
        Ok(())
    }

    /// Select `id` and open its text for editing.
    pub fn enter_edit_mode(&mut self, id: LayerId) -> PosterResult<()> {
        self.index_of(id)?;
        self.selection = Selection::Editing(id);
        tracing::debug!(%id, "edit mode entered");
        Ok(())
    }

    /// Leave edit mode, keeping the layer selected. Returns `false` if not editing.
    pub fn exit_edit_mode(&mut self) -> bool {
        match self.selection {
            Selection::Editing(id) => {
                self.selection = Selection::Selected(id);
                tracing::debug!(%id, "edit mode exited");
                true
            }
            _ => false,
        }
    }

    /// Move a layer to `index` in draw order (clamped to the last position).
    pub fn reorder_layer(&mut self, id: LayerId, index: usize) -> PosterResult<()> {
        let from = self.index_of(id)?;
        let layer = self.layers.remove(from);
        let to = index.min(self.layers.len());
        self.layers.insert(to, layer);
        Ok(())
    }

    /// Swap a layer with the one drawn after it.
    pub fn bring_forward(&mut self, id: LayerId) -> PosterResult<()> {
        let idx = self.index_of(id)?;
        if idx + 1 < self.layers.len() {
            self.layers.swap(idx, idx + 1);
        }
        Ok(())
    }

    /// Swap a layer with the one drawn before it.
    pub fn send_backward(&mut self, id: LayerId) -> PosterResult<()> {
        let idx = self.index_of(id)?;
        if idx > 0 {
            self.layers.swap(idx, idx - 1);
        }
        Ok(())
    }

    fn fresh_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: LayerId) -> PosterResult<usize> {
        self.layers.iter().position(|l| l.id == id).ok_or_else(|| {
            tracing::warn!(%id, "layer not found");
            PosterError::LayerNotFound(id)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
