//! Homogeneous 2D vectors and 3x3 affine matrices.
//!
//! Both types are immutable values backed by glam. Every operation returns a
//! new value; nothing here mutates in place.
//!
//! Composition is right-to-left: `(a * b) * v == a * (b * v)`, so `b` is
//! applied first.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::{Mat3, Vec2, Vec3};

/// Relative tolerance used by `PartialEq` on [`Vector`] and [`Matrix`].
pub const EPSILON: f32 = 1e-5;

/// Compare two floats with a tolerance scaled by their magnitude (floored at 1).
pub(crate) fn approx(a: f32, b: f32, epsilon: f32) -> bool {
    let scale = 1.0_f32.max(a.abs()).max(b.abs());
    (a - b).abs() <= epsilon * scale
}

/// 2D point or direction with an implicit homogeneous `w = 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector(Vec2);

impl Vector {
    pub const ZERO: Self = Self(Vec2::ZERO);

    pub const fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn x(self) -> f32 {
        self.0.x
    }

    pub fn y(self) -> f32 {
        self.0.y
    }

    /// Homogeneous coordinates `(x, y, 1)`.
    pub fn homogeneous(self) -> [f32; 3] {
        [self.0.x, self.0.y, 1.0]
    }

    /// Euclidean length.
    pub fn magnitude(self) -> f32 {
        self.0.length()
    }

    /// Unit vector in the same direction. A zero vector is returned unchanged.
    pub fn normalized(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            self
        } else {
            Self(self.0 / magnitude)
        }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.0.dot(other.0)
    }

    /// Z component of the 3D cross product with `z = 0` on both operands.
    pub fn cross(self, other: Self) -> f32 {
        self.0.perp_dot(other.0)
    }

    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        approx(self.0.x, other.0.x, epsilon) && approx(self.0.y, other.0.y, epsilon)
    }

    pub fn as_vec2(self) -> Vec2 {
        self.0
    }

    pub fn to_array(self) -> [f32; 2] {
        self.0.to_array()
    }
}

impl From<Vec2> for Vector {
    fn from(v: Vec2) -> Self {
        Self(v)
    }
}

impl From<Vector> for Vec2 {
    fn from(v: Vector) -> Self {
        v.0
    }
}

impl From<[f32; 2]> for Vector {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f32, f32)> for Vector {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(*other, EPSILON)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector({}, {})", self.0.x, self.0.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector(self.0 + rhs.0)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        Vector(self.0 * rhs)
    }
}

impl Div<f32> for Vector {
    type Output = Vector;

    fn div(self, rhs: f32) -> Vector {
        Vector(self.0 / rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector(-self.0)
    }
}

/// 3x3 homogeneous transform.
///
/// The factory functions only ever produce affine matrices (bottom row
/// `(0, 0, 1)`), so `w` stays 1 for every transformed [`Vector`].
#[derive(Debug, Clone, Copy)]
pub struct Matrix(Mat3);

impl Matrix {
    pub const IDENTITY: Self = Self(Mat3::IDENTITY);

    /// Build from row-major data.
    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self(Mat3::from_cols_array_2d(&rows).transpose())
    }

    /// Row-major copy of the data.
    pub fn rows(&self) -> [[f32; 3]; 3] {
        self.0.transpose().to_cols_array_2d()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0.col(col)[row]
    }

    /// Uniform scale `(f, f, 1)`.
    pub fn scale(factor: f32) -> Self {
        Self::from_rows([
            [factor, 0.0, 0.0],
            [0.0, factor, 0.0],
            [0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation by `theta` radians.
    pub fn rotate(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_rows([
            [c, -s, 0.0],
            [s, c, 0.0],
            [0.0, 0.0, 1.0],
        ])
    }

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, dx],
            [0.0, 1.0, dy],
            [0.0, 0.0, 1.0],
        ])
    }

    pub fn translate_by(offset: Vector) -> Self {
        Self::translate(offset.x(), offset.y())
    }

    pub fn determinant(&self) -> f32 {
        self.0.determinant()
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Inverse via the adjugate divided by the determinant.
    ///
    /// Returns `None` when the determinant is zero (or not finite).
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let [[a, b, c], [d, e, f], [g, h, i]] = self.rows();
        let adjugate = Self::from_rows([
            [e * i - f * h, c * h - b * i, b * f - c * e],
            [f * g - d * i, a * i - c * g, c * d - a * f],
            [d * h - e * g, b * g - a * h, a * e - b * d],
        ]);
        Some(adjugate * (1.0 / det))
    }

    /// Whether the bottom row is `(0, 0, 1)` within [`EPSILON`].
    pub fn is_affine(&self) -> bool {
        approx(self.get(2, 0), 0.0, EPSILON)
            && approx(self.get(2, 1), 0.0, EPSILON)
            && approx(self.get(2, 2), 1.0, EPSILON)
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.0
            .to_cols_array()
            .iter()
            .zip(other.0.to_cols_array().iter())
            .all(|(a, b)| approx(*a, *b, epsilon))
    }

    pub fn as_mat3(&self) -> Mat3 {
        self.0
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat3> for Matrix {
    fn from(m: Mat3) -> Self {
        Self(m)
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, EPSILON)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rows();
        write!(f, "Matrix({:?}, {:?}, {:?})", r[0], r[1], r[2])
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        Matrix(self.0 * rhs.0)
    }
}

impl Mul<Vector> for Matrix {
    type Output = Vector;

    fn mul(self, rhs: Vector) -> Vector {
        let v = self.0 * Vec3::new(rhs.x(), rhs.y(), 1.0);
        Vector::new(v.x, v.y)
    }
}

impl Mul<f32> for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f32) -> Matrix {
        Matrix(self.0 * rhs)
    }
}
