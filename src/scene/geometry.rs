use crate::foundation::core::{Affine, Point, Rect, Size, Vec2};
use crate::scene::layer::LayerGeometry;

/// Box corner, clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Top-left.
    TopLeft,
    /// Top-right.
    TopRight,
    /// Bottom-right.
    BottomRight,
    /// Bottom-left.
    BottomLeft,
}

impl Corner {
    /// All corners in drawing order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position in the unscaled local box.
    pub fn local(self, size: Size) -> Point {
        match self {
            Corner::TopLeft => Point::new(0.0, 0.0),
            Corner::TopRight => Point::new(size.width, 0.0),
            Corner::BottomRight => Point::new(size.width, size.height),
            Corner::BottomLeft => Point::new(0.0, size.height),
        }
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }
}

/// A transform handle of the selected layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Corner resize handle.
    Resize(Corner),
    /// Rotation handle above the top edge.
    Rotate,
}

/// Local box -> canvas transform.
///
/// The box spans `(0,0)..(w,h)` and is centered on the layer position before scale and rotation.
pub fn layer_transform(g: &LayerGeometry, size: Size) -> Affine {
    Affine::translate((g.x, g.y))
        * Affine::rotate(g.rotation_deg.to_radians())
        * Affine::scale_non_uniform(g.scale_x, g.scale_y)
        * Affine::translate((-size.width / 2.0, -size.height / 2.0))
}

/// Canvas-space corner positions.
pub fn corners(g: &LayerGeometry, size: Size) -> [Point; 4] {
    let t = layer_transform(g, size);
    Corner::ALL.map(|c| t * c.local(size))
}

/// Axis-aligned bounds of the transformed box.
pub fn bounds(g: &LayerGeometry, size: Size) -> Rect {
    let pts = corners(g, size);
    let mut r = Rect::from_points(pts[0], pts[0]);
    for p in &pts[1..] {
        r = r.union_pt(*p);
    }
    r
}

/// Return `true` if canvas point `p` falls inside the box grown by `slop` local pixels.
pub fn contains(g: &LayerGeometry, size: Size, p: Point, slop: f64) -> bool {
    let t = layer_transform(g, size);
    if t.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = t.inverse() * p;
    local.x >= -slop
        && local.y >= -slop
        && local.x <= size.width + slop
        && local.y <= size.height + slop
}

/// Unit vector pointing "up" in the layer's rotated frame.
pub fn up_vector(g: &LayerGeometry) -> Vec2 {
    let r = g.rotation_deg.to_radians();
    Vec2::new(r.sin(), -r.cos())
}

/// Canvas-space positions of every handle; the rotation handle sits `rotate_offset` pixels above
/// the top edge's midpoint.
pub fn handles(g: &LayerGeometry, size: Size, rotate_offset: f64) -> Vec<(Handle, Point)> {
    let t = layer_transform(g, size);
    let mut out: Vec<(Handle, Point)> = Corner::ALL
        .iter()
        .map(|&c| (Handle::Resize(c), t * c.local(size)))
        .collect();
    let top_mid = t * Point::new(size.width / 2.0, 0.0);
    out.push((Handle::Rotate, top_mid + up_vector(g) * rotate_offset));
    out
}

/// Angle of `p` around `center`, in degrees, with 0 pointing up and growing clockwise.
pub fn angle_from_up(center: Point, p: Point) -> f64 {
    let d = p - center;
    d.x.atan2(-d.y).to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/geometry.rs"]
mod tests;
