use crate::foundation::core::{Affine, LayerId, Point, Size, Vec2, normalize_degrees};
use crate::foundation::error::{PosterError, PosterResult};
use crate::interact::event::{Action, InputEvent, Key, Modifiers};
use crate::interact::overlay::{SelectionOverlay, selection_overlay};
use crate::scene::geometry::{self, Corner, Handle};
use crate::scene::layer::{LayerGeometry, LayerPatch};
use crate::scene::measure::TextMeasure;
use crate::scene::model::{Scene, Selection};

const MIN_GESTURE_SCALE: f64 = 0.01;

/// Controller tuning.
#[derive(Clone, Debug)]
pub struct InteractOpts {
    /// Window for the second click that opens edit mode.
    pub double_click_ms: u64,
    /// Distance of the rotation handle above the top edge.
    pub rotate_handle_offset: f64,
    /// Pick radius around handles.
    pub handle_radius: f64,
    /// Angle step used while snapping rotation.
    pub rotation_snap_deg: f64,
}

impl Default for InteractOpts {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            rotate_handle_offset: 30.0,
            handle_radius: 10.0,
            rotation_snap_deg: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Gesture {
    Idle,
    Dragging {
        id: LayerId,
        origin: LayerGeometry,
        grab: Point,
    },
    Resizing {
        id: LayerId,
        origin: LayerGeometry,
        corner: Corner,
        anchor: Point,
        size: Size,
    },
    Rotating {
        id: LayerId,
        origin: LayerGeometry,
        start_angle: f64,
    },
}

impl Gesture {
    fn target(self) -> Option<(LayerId, LayerGeometry)> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { id, origin, .. }
            | Gesture::Resizing { id, origin, .. }
            | Gesture::Rotating { id, origin, .. } => Some((id, origin)),
        }
    }
}

/// Maps pointer and key input onto scene mutations.
///
/// Every geometry change is written with [`Scene::set_geometry`], so position, rotation and scale
/// land together.
#[derive(Clone, Debug)]
pub struct Controller {
    opts: InteractOpts,
    gesture: Gesture,
    last_click: Option<(LayerId, u64)>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(InteractOpts::default())
    }
}

impl Controller {
    /// Idle controller.
    pub fn new(opts: InteractOpts) -> Self {
        Self {
            opts,
            gesture: Gesture::Idle,
            last_click: None,
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> &InteractOpts {
        &self.opts
    }

    /// Return `true` while a drag, resize or rotate is in progress.
    pub fn is_transforming(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Feed one input event.
    pub fn handle_event(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        event: InputEvent,
    ) -> Action {
        match event {
            InputEvent::PointerDown {
                pos,
                t_ms,
                modifiers: _,
            } => self.pointer_down(scene, measure, pos, t_ms),
            InputEvent::PointerMove { pos, modifiers } => self.pointer_move(scene, pos, modifiers),
            InputEvent::PointerUp { .. } => self.pointer_up(scene),
            InputEvent::DoubleClick { pos } => match hit_layer(scene, measure, pos) {
                Some(id) => self.open_editor(scene, id),
                None => Action::None,
            },
            InputEvent::Key(Key::Escape) => {
                if self.is_transforming() {
                    self.cancel(scene)
                } else {
                    close_editor(scene)
                }
            }
            InputEvent::Key(Key::Enter) | InputEvent::Blur => close_editor(scene),
        }
    }

    /// Replace the content of the layer being edited.
    pub fn input_text(&mut self, scene: &mut Scene, text: &str) -> PosterResult<Action> {
        let Selection::Editing(id) = scene.selection() else {
            return Err(PosterError::validation("no layer is in edit mode"));
        };
        scene.update_layer(
            id,
            &LayerPatch {
                text: Some(text.to_owned()),
                ..LayerPatch::default()
            },
        )?;
        Ok(Action::TextChanged(id))
    }

    /// Abort the current gesture and restore the layer's geometry in one update.
    pub fn cancel(&mut self, scene: &mut Scene) -> Action {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Some((id, origin)) = gesture.target() else {
            return Action::None;
        };
        match scene.set_geometry(id, origin) {
            Ok(()) => Action::TransformCancelled(id),
            Err(_) => Action::None,
        }
    }

    /// Outline and handles for the current selection.
    pub fn overlay(&self, scene: &Scene, measure: &dyn TextMeasure) -> Option<SelectionOverlay> {
        selection_overlay(
            scene,
            measure,
            self.opts.rotate_handle_offset,
            self.opts.handle_radius,
        )
    }

    fn pointer_down(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        pos: Point,
        t_ms: u64,
    ) -> Action {
        if self.is_transforming() {
            self.cancel(scene);
        }

        if let Some(action) = self.grab_handle(scene, measure, pos) {
            self.last_click = None;
            return action;
        }

        let Some(id) = hit_layer(scene, measure, pos) else {
            self.last_click = None;
            let had = scene.selected().is_some();
            let _ = scene.select(None);
            return if had {
                Action::SelectionChanged(None)
            } else {
                Action::None
            };
        };

        match scene.selection() {
            Selection::Editing(cur) if cur == id => return Action::None,
            Selection::Selected(cur) if cur == id => {
                let quick = self.last_click.is_some_and(|(prev, t)| {
                    prev == id && t_ms.saturating_sub(t) <= self.opts.double_click_ms
                });
                if quick {
                    self.last_click = None;
                    return self.open_editor(scene, id);
                }
            }
            _ => {}
        }

        let changed = scene.selected() != Some(id) || scene.is_editing();
        if scene.select(Some(id)).is_err() {
            return Action::None;
        }
        self.last_click = Some((id, t_ms));
        if let Some(layer) = scene.layer(id) {
            self.gesture = Gesture::Dragging {
                id,
                origin: layer.geometry(),
                grab: pos,
            };
        }
        if changed {
            Action::SelectionChanged(Some(id))
        } else {
            Action::None
        }
    }

    fn grab_handle(
        &mut self,
        scene: &Scene,
        measure: &dyn TextMeasure,
        pos: Point,
    ) -> Option<Action> {
        let layer = scene.layer(scene.selected()?)?;
        if !layer.visible {
            return None;
        }
        let size = measure.measure(layer);
        let origin = layer.geometry();
        let radius = self.opts.handle_radius;

        let (handle, _) = geometry::handles(&origin, size, self.opts.rotate_handle_offset)
            .into_iter()
            .filter(|(_, p)| (*p - pos).hypot() <= radius)
            .min_by(|(_, a), (_, b)| (*a - pos).hypot().total_cmp(&(*b - pos).hypot()))?;

        let id = layer.id;
        self.gesture = match handle {
            Handle::Resize(corner) => {
                let t = geometry::layer_transform(&origin, size);
                Gesture::Resizing {
                    id,
                    origin,
                    corner,
                    anchor: t * corner.opposite().local(size),
                    size,
                }
            }
            Handle::Rotate => Gesture::Rotating {
                id,
                origin,
                start_angle: geometry::angle_from_up(origin.center(), pos),
            },
        };
        Some(Action::None)
    }

    fn pointer_move(&mut self, scene: &mut Scene, pos: Point, modifiers: Modifiers) -> Action {
        let (id, next) = match self.gesture {
            Gesture::Idle => return Action::None,
            Gesture::Dragging { id, origin, grab } => {
                let d = pos - grab;
                (
                    id,
                    LayerGeometry {
                        x: origin.x + d.x,
                        y: origin.y + d.y,
                        ..origin
                    },
                )
            }
            Gesture::Resizing {
                id,
                origin,
                corner,
                anchor,
                size,
            } => (
                id,
                resize_geometry(origin, corner, anchor, size, pos, modifiers.shift),
            ),
            Gesture::Rotating {
                id,
                origin,
                start_angle,
            } => {
                let delta = geometry::angle_from_up(origin.center(), pos) - start_angle;
                let mut rotation = origin.rotation_deg + normalize_angle_delta(delta);
                if modifiers.shift && self.opts.rotation_snap_deg > 0.0 {
                    let step = self.opts.rotation_snap_deg;
                    rotation = (rotation / step).round() * step;
                }
                (
                    id,
                    LayerGeometry {
                        rotation_deg: normalize_degrees(rotation),
                        ..origin
                    },
                )
            }
        };

        match scene.set_geometry(id, next) {
            Ok(()) => Action::Transforming(id),
            Err(_) => {
                self.gesture = Gesture::Idle;
                Action::None
            }
        }
    }

    fn pointer_up(&mut self, scene: &mut Scene) -> Action {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Some((id, from)) = gesture.target() else {
            return Action::None;
        };
        let Some(to) = scene.layer(id).map(|l| l.geometry()) else {
            return Action::None;
        };
        if to == from {
            return Action::None;
        }
        tracing::debug!(%id, ?from, ?to, "transform committed");
        Action::TransformCommitted { id, from, to }
    }

    fn open_editor(&mut self, scene: &mut Scene, id: LayerId) -> Action {
        if self.is_transforming() {
            self.cancel(scene);
        }
        match scene.enter_edit_mode(id) {
            Ok(()) => Action::EditModeEntered(id),
            Err(_) => Action::None,
        }
    }
}

fn close_editor(scene: &mut Scene) -> Action {
    match scene.selection() {
        Selection::Editing(id) => {
            scene.exit_edit_mode();
            Action::EditModeExited(id)
        }
        _ => Action::None,
    }
}

/// Top-most visible layer under `pos`.
fn hit_layer(scene: &Scene, measure: &dyn TextMeasure, pos: Point) -> Option<LayerId> {
    scene
        .layers()
        .iter()
        .rev()
        .filter(|l| l.visible)
        .find(|l| geometry::contains(&l.geometry(), measure.measure(l), pos, 0.0))
        .map(|l| l.id)
}

/// Scale around the corner opposite the dragged one; the anchor stays put.
fn resize_geometry(
    origin: LayerGeometry,
    corner: Corner,
    anchor: Point,
    size: Size,
    pos: Point,
    uniform: bool,
) -> LayerGeometry {
    let dir = corner.local(size) - corner.opposite().local(size);
    let sign = Vec2::new(dir.x.signum(), dir.y.signum());
    let rot = origin.rotation_deg.to_radians();
    let local = Affine::rotate(-rot) * (pos - anchor).to_point();
    let w = size.width.max(1e-6);
    let h = size.height.max(1e-6);

    let (scale_x, scale_y) = if uniform {
        let diag = Vec2::new(sign.x * w * origin.scale_x, sign.y * h * origin.scale_y);
        let k = (local.to_vec2().dot(diag) / diag.hypot2()).max(MIN_GESTURE_SCALE);
        (origin.scale_x * k, origin.scale_y * k)
    } else {
        (
            (local.x * sign.x / w).max(MIN_GESTURE_SCALE),
            (local.y * sign.y / h).max(MIN_GESTURE_SCALE),
        )
    };

    let half = Vec2::new(sign.x * w * scale_x / 2.0, sign.y * h * scale_y / 2.0);
    let center = anchor + (Affine::rotate(rot) * half.to_point()).to_vec2();
    LayerGeometry {
        x: center.x,
        y: center.y,
        rotation_deg: origin.rotation_deg,
        scale_x,
        scale_y,
    }
}

fn normalize_angle_delta(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
#[path = "../../tests/unit/interact/controller.rs"]
mod tests;
