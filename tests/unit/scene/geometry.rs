use super::*;

fn geom(x: f64, y: f64, rot: f64, sx: f64, sy: f64) -> LayerGeometry {
    LayerGeometry {
        x,
        y,
        rotation_deg: rot,
        scale_x: sx,
        scale_y: sy,
    }
}

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn unrotated_box_is_centered_on_position() {
    let g = geom(100.0, 50.0, 0.0, 1.0, 1.0);
    let c = corners(&g, Size::new(40.0, 20.0));
    assert!(close(c[0], Point::new(80.0, 40.0)));
    assert!(close(c[2], Point::new(120.0, 60.0)));
    assert_eq!(bounds(&g, Size::new(40.0, 20.0)), Rect::new(80.0, 40.0, 120.0, 60.0));
}

#[test]
fn rotation_is_clockwise_around_center() {
    let g = geom(0.0, 0.0, 90.0, 1.0, 1.0);
    let c = corners(&g, Size::new(40.0, 20.0));
    assert!(close(c[0], Point::new(10.0, -20.0)));
}

#[test]
fn scale_grows_box_around_center() {
    let g = geom(0.0, 0.0, 0.0, 2.0, 3.0);
    let b = bounds(&g, Size::new(10.0, 10.0));
    assert!((b.width() - 20.0).abs() < 1e-9);
    assert!((b.height() - 30.0).abs() < 1e-9);
    assert!(close(b.center(), Point::ORIGIN));
}

#[test]
fn contains_respects_rotation() {
    let g = geom(0.0, 0.0, 90.0, 1.0, 1.0);
    let size = Size::new(100.0, 10.0);
    assert!(contains(&g, size, Point::new(0.0, 40.0), 0.0));
    assert!(!contains(&g, size, Point::new(40.0, 0.0), 0.0));
    assert!(contains(&g, size, Point::new(7.0, 0.0), 3.0));
}

#[test]
fn rotate_handle_sits_above_top_edge() {
    let g = geom(50.0, 50.0, 0.0, 1.0, 1.0);
    let hs = handles(&g, Size::new(20.0, 20.0), 30.0);
    assert_eq!(hs.len(), 5);
    let (kind, p) = hs[4];
    assert_eq!(kind, Handle::Rotate);
    assert!(close(p, Point::new(50.0, 10.0)));

    let g = geom(50.0, 50.0, 90.0, 1.0, 1.0);
    let (_, p) = handles(&g, Size::new(20.0, 20.0), 30.0)[4];
    assert!(close(p, Point::new(90.0, 50.0)));
}

#[test]
fn angle_from_up_is_clockwise_degrees() {
    let c = Point::new(0.0, 0.0);
    assert!(angle_from_up(c, Point::new(0.0, -5.0)).abs() < 1e-9);
    assert!((angle_from_up(c, Point::new(5.0, 0.0)) - 90.0).abs() < 1e-9);
    assert!((angle_from_up(c, Point::new(-5.0, 0.0)) + 90.0).abs() < 1e-9);
}

#[test]
fn opposite_corners_pair_up() {
    for c in Corner::ALL {
        assert_eq!(c.opposite().opposite(), c);
        assert_ne!(c.opposite(), c);
    }
}
