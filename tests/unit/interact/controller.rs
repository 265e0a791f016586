use super::*;
use crate::foundation::core::Canvas;
use crate::scene::layer::{LayerPreset, TextLayer};
use crate::scene::measure::EstimateMeasure;

const M: EstimateMeasure = EstimateMeasure;

// Layer box is 60x20 (10 chars at 10px with 0.6em advance), centered on (100, 100).
fn scene_with_layer() -> (Scene, LayerId) {
    let mut scene = Scene::new();
    let ids = scene.insert_layers([TextLayer {
        text: "0123456789".into(),
        font_size: 10.0,
        line_height: 2.0,
        x: 100.0,
        y: 100.0,
        ..TextLayer::default()
    }]);
    (scene, ids[0])
}

fn down(x: f64, y: f64, t_ms: u64) -> InputEvent {
    InputEvent::PointerDown {
        pos: Point::new(x, y),
        t_ms,
        modifiers: Modifiers::default(),
    }
}

fn mv(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        pos: Point::new(x, y),
        modifiers: Modifiers::default(),
    }
}

fn mv_shift(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        pos: Point::new(x, y),
        modifiers: Modifiers { shift: true },
    }
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp {
        pos: Point::new(x, y),
    }
}

#[test]
fn click_selects_and_empty_click_clears() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();

    assert_eq!(c.handle_event(&mut scene, &M, down(100.0, 100.0, 0)), Action::SelectionChanged(Some(id)));
    c.handle_event(&mut scene, &M, up(100.0, 100.0));
    assert_eq!(scene.selected(), Some(id));

    assert_eq!(c.handle_event(&mut scene, &M, down(500.0, 500.0, 1000)), Action::SelectionChanged(None));
    assert_eq!(scene.selected(), None);
    assert_eq!(c.handle_event(&mut scene, &M, down(500.0, 500.0, 2000)), Action::None);
}

#[test]
fn second_quick_click_enters_edit_mode() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();

    c.handle_event(&mut scene, &M, down(100.0, 100.0, 1000));
    c.handle_event(&mut scene, &M, up(100.0, 100.0));
    assert_eq!(c.handle_event(&mut scene, &M, down(101.0, 100.0, 1200)), Action::EditModeEntered(id));
    assert_eq!(scene.selection(), Selection::Editing(id));
    assert!(!c.is_transforming());

    assert_eq!(c.handle_event(&mut scene, &M, InputEvent::Key(Key::Enter)), Action::EditModeExited(id));
    assert_eq!(scene.selection(), Selection::Selected(id));
}

#[test]
fn slow_second_click_only_starts_a_drag() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();

    c.handle_event(&mut scene, &M, down(100.0, 100.0, 1000));
    c.handle_event(&mut scene, &M, up(100.0, 100.0));
    assert_eq!(c.handle_event(&mut scene, &M, down(100.0, 100.0, 1400)), Action::None);
    assert_eq!(scene.selection(), Selection::Selected(id));
    assert!(c.is_transforming());
}

#[test]
fn edit_mode_ends_on_blur_and_escape() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();

    c.handle_event(&mut scene, &M, InputEvent::DoubleClick { pos: Point::new(100.0, 100.0) });
    assert!(scene.is_editing());
    assert_eq!(c.handle_event(&mut scene, &M, InputEvent::Blur), Action::EditModeExited(id));

    c.handle_event(&mut scene, &M, InputEvent::DoubleClick { pos: Point::new(100.0, 100.0) });
    assert_eq!(c.handle_event(&mut scene, &M, InputEvent::Key(Key::Escape)), Action::EditModeExited(id));
    assert!(!scene.is_editing());
}

#[test]
fn clicking_empty_canvas_while_editing_clears_everything() {
    let (mut scene, _) = scene_with_layer();
    let mut c = Controller::default();
    c.handle_event(&mut scene, &M, InputEvent::DoubleClick { pos: Point::new(100.0, 100.0) });
    c.handle_event(&mut scene, &M, down(900.0, 900.0, 0));
    assert_eq!(scene.selection(), Selection::None);
}

#[test]
fn input_text_requires_edit_mode() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    assert!(c.input_text(&mut scene, "nope").is_err());

    c.handle_event(&mut scene, &M, InputEvent::DoubleClick { pos: Point::new(100.0, 100.0) });
    assert_eq!(c.input_text(&mut scene, "Hello").unwrap(), Action::TextChanged(id));
    assert_eq!(scene.layer(id).unwrap().text, "Hello");
}

#[test]
fn drag_moves_and_commits_on_release() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();

    c.handle_event(&mut scene, &M, down(100.0, 100.0, 0));
    assert_eq!(c.handle_event(&mut scene, &M, mv(110.0, 95.0)), Action::Transforming(id));
    assert_eq!(c.handle_event(&mut scene, &M, mv(130.0, 120.0)), Action::Transforming(id));
    let l = scene.layer(id).unwrap();
    assert_eq!((l.x, l.y), (130.0, 120.0));

    match c.handle_event(&mut scene, &M, up(130.0, 120.0)) {
        Action::TransformCommitted { id: got, from, to } => {
            assert_eq!(got, id);
            assert_eq!((from.x, from.y), (100.0, 100.0));
            assert_eq!((to.x, to.y), (130.0, 120.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!c.is_transforming());
}

#[test]
fn click_without_motion_commits_nothing() {
    let (mut scene, _) = scene_with_layer();
    let mut c = Controller::default();
    c.handle_event(&mut scene, &M, down(100.0, 100.0, 0));
    assert_eq!(c.handle_event(&mut scene, &M, up(100.0, 100.0)), Action::None);
}

#[test]
fn escape_cancels_gesture_atomically() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    let before = scene.layer(id).unwrap().geometry();

    c.handle_event(&mut scene, &M, down(100.0, 100.0, 0));
    c.handle_event(&mut scene, &M, mv(300.0, 300.0));
    assert_eq!(c.handle_event(&mut scene, &M, InputEvent::Key(Key::Escape)), Action::TransformCancelled(id));
    assert_eq!(scene.layer(id).unwrap().geometry(), before);
    assert_eq!(scene.selected(), Some(id));
    assert_eq!(c.handle_event(&mut scene, &M, mv(10.0, 10.0)), Action::None);
}

#[test]
fn corner_handle_resizes_around_opposite_corner() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    c.handle_event(&mut scene, &M, down(100.0, 100.0, 0));
    c.handle_event(&mut scene, &M, up(100.0, 100.0));

    // Bottom-right corner sits at (130, 110); top-left at (70, 90).
    c.handle_event(&mut scene, &M, down(131.0, 111.0, 5000));
    c.handle_event(&mut scene, &M, mv(190.0, 130.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!((g.scale_x - 2.0).abs() < 1e-9);
    assert!((g.scale_y - 2.0).abs() < 1e-9);
    assert!((g.x - 130.0).abs() < 1e-9 && (g.y - 110.0).abs() < 1e-9);

    c.handle_event(&mut scene, &M, mv(0.0, 0.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!(g.scale_x > 0.0 && g.scale_y > 0.0);

    assert!(matches!(
        c.handle_event(&mut scene, &M, up(0.0, 0.0)),
        Action::TransformCommitted { .. }
    ));
}

#[test]
fn shift_resize_keeps_aspect() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    scene.select(Some(id)).unwrap();

    c.handle_event(&mut scene, &M, down(130.0, 110.0, 0));
    c.handle_event(&mut scene, &M, mv_shift(250.0, 115.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!((g.scale_x - g.scale_y).abs() < 1e-9);
    assert!(g.scale_x > 1.0);
}

#[test]
fn rotate_handle_rotates_and_snaps() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    scene.select(Some(id)).unwrap();

    // Rotation handle: 30px above the top edge midpoint (100, 90).
    c.handle_event(&mut scene, &M, down(100.0, 60.0, 0));
    c.handle_event(&mut scene, &M, mv(140.0, 100.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!((g.rotation_deg - 90.0).abs() < 1e-9);
    assert_eq!((g.x, g.y), (100.0, 100.0));

    c.handle_event(&mut scene, &M, mv_shift(140.0, 93.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!((g.rotation_deg - 75.0).abs() < 1e-9, "{}", g.rotation_deg);
    c.handle_event(&mut scene, &M, up(140.0, 93.0));
}

#[test]
fn counter_clockwise_rotation_is_stored_in_positive_degrees() {
    let (mut scene, id) = scene_with_layer();
    let mut c = Controller::default();
    scene.select(Some(id)).unwrap();

    c.handle_event(&mut scene, &M, down(100.0, 60.0, 0));
    c.handle_event(&mut scene, &M, mv(60.0, 100.0));
    c.handle_event(&mut scene, &M, up(60.0, 100.0));
    let g = scene.layer(id).unwrap().geometry();
    assert!((g.rotation_deg - 270.0).abs() < 1e-9, "{}", g.rotation_deg);
}

#[test]
fn topmost_visible_layer_wins_hit_test() {
    let mut scene = Scene::new();
    let canvas = Canvas::new(200, 200);
    let a = scene.add_layer(LayerPreset::Body, canvas, None);
    let b = scene.add_layer(LayerPreset::Body, canvas, None);
    let mut c = Controller::default();

    c.handle_event(&mut scene, &M, down(100.0, 100.0, 0));
    assert_eq!(scene.selected(), Some(b));
    c.handle_event(&mut scene, &M, up(100.0, 100.0));

    scene.set_visible(b, false).unwrap();
    c.handle_event(&mut scene, &M, down(100.0, 100.0, 1000));
    assert_eq!(scene.selected(), Some(a));
}

#[test]
fn overlay_tracks_selection() {
    let (mut scene, id) = scene_with_layer();
    let c = Controller::default();
    assert!(c.overlay(&scene, &M).is_none());
    scene.select(Some(id)).unwrap();
    let o = c.overlay(&scene, &M).unwrap();
    assert_eq!(o.layer, id);
    assert_eq!(o.handles.len(), 5);
    scene.set_visible(id, false).unwrap();
    assert!(c.overlay(&scene, &M).is_none());
}
