use crate::foundation::core::{LayerId, Point};
use crate::scene::layer::LayerGeometry;

/// Modifier keys held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift: uniform scaling on resize, angle snapping on rotate.
    pub shift: bool,
}

/// Keys the controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Ends edit mode.
    Enter,
    /// Cancels a gesture, or ends edit mode.
    Escape,
}

/// Input in canvas pixel space. `t_ms` is a monotonic host timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// Canvas position.
        pos: Point,
        /// Host timestamp in milliseconds.
        t_ms: u64,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Pointer moved.
    PointerMove {
        /// Canvas position.
        pos: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Primary button released.
    PointerUp {
        /// Canvas position.
        pos: Point,
    },
    /// Host-detected double click.
    DoubleClick {
        /// Canvas position.
        pos: Point,
    },
    /// Key pressed.
    Key(Key),
    /// The text editor lost focus.
    Blur,
}

/// What an input event did to the scene, for the host to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Nothing changed.
    None,
    /// Selection changed; `None` means cleared.
    SelectionChanged(Option<LayerId>),
    /// Edit mode opened on a layer.
    EditModeEntered(LayerId),
    /// Edit mode closed; the layer stays selected.
    EditModeExited(LayerId),
    /// Geometry changed mid-gesture.
    Transforming(LayerId),
    /// A gesture finished and changed the layer.
    TransformCommitted {
        /// Layer that moved.
        id: LayerId,
        /// Geometry before the gesture.
        from: LayerGeometry,
        /// Geometry after the gesture.
        to: LayerGeometry,
    },
    /// A gesture was aborted and the layer restored.
    TransformCancelled(LayerId),
    /// Edited text was written to a layer.
    TextChanged(LayerId),
}
