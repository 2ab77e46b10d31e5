//! Geometric queries: bounding boxes, segment intersection, point-in-triangle.
//!
//! None of these are wired into a collision response; they are exposed for
//! game code that wants broad- or narrow-phase checks.

use glam::Vec3;

use super::math::Vector;

/// Tolerance for treating two segment directions as parallel, relative to
/// the product of their lengths.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    /// Running min/max over the points in a single sweep. `None` if empty.
    pub fn from_points(points: &[Vector]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(first.x(), first.x(), first.y(), first.y());
        for p in rest {
            bounds.x_min = bounds.x_min.min(p.x());
            bounds.x_max = bounds.x_max.max(p.x());
            bounds.y_min = bounds.y_min.min(p.y());
            bounds.y_max = bounds.y_max.max(p.y());
        }
        Some(bounds)
    }

    /// `[x_min, x_max, y_min, y_max]`.
    pub fn as_array(&self) -> [f32; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Vector {
        Vector::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vector) -> bool {
        p.x() >= self.x_min && p.x() <= self.x_max && p.y() >= self.y_min && p.y() <= self.y_max
    }

    /// Touching edges count as overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        rect_overlap(self.as_array(), other.as_array())
    }
}

impl From<[f32; 4]> for Bounds {
    fn from([x_min, x_max, y_min, y_max]: [f32; 4]) -> Self {
        Self::new(x_min, x_max, y_min, y_max)
    }
}

/// Overlap test on `[x_min, x_max, y_min, y_max]` rectangles.
pub fn rect_overlap(a: [f32; 4], b: [f32; 4]) -> bool {
    let [a_left, a_right, a_top, a_bottom] = a;
    let [b_left, b_right, b_top, b_bottom] = b;
    !(a_right < b_left || a_left > b_right || a_bottom < b_top || a_top > b_bottom)
}

/// Result of [`segment_intersection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    None,
    /// The segments cross at a single point.
    Point(Vector),
    /// The segments are collinear and share at least one point.
    Overlapping,
}

impl Intersection {
    pub fn is_none(&self) -> bool {
        matches!(self, Intersection::None)
    }

    pub fn point(&self) -> Option<Vector> {
        match self {
            Intersection::Point(p) => Some(*p),
            _ => None,
        }
    }
}

/// Intersect segment `p0 -> p1` with segment `p2 -> p3`.
///
/// Solves `p + t r = q + u s` with `r = p1 - p0`, `s = p3 - p2`. Parallel
/// segments fall back to a collinearity check and an overlap check along the
/// shared direction.
pub fn segment_intersection(p0: Vector, p1: Vector, p2: Vector, p3: Vector) -> Intersection {
    let (p, q) = (p0, p2);
    let (r, s) = (p1 - p0, p3 - p2);
    let qp = q - p;

    let rs = r.cross(s);
    let scale = r.magnitude() * s.magnitude();
    if rs.abs() <= PARALLEL_EPSILON * scale.max(f32::MIN_POSITIVE) {
        return collinear_overlap(p, r, q, s);
    }

    let t = qp.cross(s) / rs;
    let u = qp.cross(r) / rs;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Intersection::Point(p + r * t)
    } else {
        Intersection::None
    }
}

fn collinear_overlap(p: Vector, r: Vector, q: Vector, s: Vector) -> Intersection {
    let qp = q - p;
    let tolerance = PARALLEL_EPSILON * qp.magnitude().max(1.0) * r.magnitude().max(s.magnitude()).max(1.0);
    if qp.cross(r).abs() > tolerance || qp.cross(s).abs() > tolerance {
        return Intersection::None;
    }

    // Degenerate segments (points) need an explicit on-segment check.
    let rr = r.dot(r);
    let ss = s.dot(s);
    let q_on_pr = rr > 0.0 && (0.0..=rr).contains(&qp.dot(r));
    let q_end_on_pr = rr > 0.0 && (0.0..=rr).contains(&(q + s - p).dot(r));
    let p_on_qs = ss > 0.0 && (0.0..=ss).contains(&(p - q).dot(s));
    let points_equal = rr == 0.0 && ss == 0.0 && qp.magnitude() == 0.0;

    if q_on_pr || q_end_on_pr || p_on_qs || points_equal {
        Intersection::Overlapping
    } else {
        Intersection::None
    }
}

/// Whether `x` lies inside (or on the edge of) the triangle `v0 v1 v2`.
///
/// Same-side test per edge: `x` and the opposite vertex must fall on the same
/// side of the edge, using the 3D cross product with `z = 0`.
pub fn point_in_triangle(v0: Vector, v1: Vector, v2: Vector, x: Vector) -> bool {
    same_side(x, v0, v1, v2) && same_side(x, v1, v0, v2) && same_side(x, v2, v0, v1)
}

fn same_side(p1: Vector, p2: Vector, a: Vector, b: Vector) -> bool {
    let edge = embed(b - a);
    let c1 = edge.cross(embed(p1 - a));
    let c2 = edge.cross(embed(p2 - a));
    c1.dot(c2) >= 0.0
}

fn embed(v: Vector) -> Vec3 {
    Vec3::new(v.x(), v.y(), 0.0)
}
