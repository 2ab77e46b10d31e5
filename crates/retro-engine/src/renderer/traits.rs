//! Drawing surface contract consumed by sprites and the camera.
//!
//! Sprites hand a surface screen-space points only; everything upstream
//! (local, world and view transforms) has already been applied.

use crate::core::math::Vector;

/// RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Fully opaque color from 0-255 channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Fill for polygons and mesh n-gons.
    pub const FILL: Self = Self::rgb(0.0, 42.0 / 255.0, 0.0);
    /// Outlines, lines and points.
    pub const OUTLINE: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::OUTLINE
    }
}

/// A 2D destination that primitives draw into.
///
/// Implementors: [`DrawList`](super::draw_list::DrawList) records commands,
/// `VectorSurface` (feature `vectors`) tessellates into a vertex buffer.
pub trait Surface {
    /// Filled polygon, closed automatically.
    fn fill_polygon(&mut self, points: &[Vector], color: Color);

    /// Anti-aliased polyline. `closed` joins the last point back to the first.
    fn stroke_polyline(&mut self, points: &[Vector], closed: bool, color: Color);

    /// Anti-aliased single segment.
    fn draw_line(&mut self, from: Vector, to: Vector, color: Color);

    fn fill_circle(&mut self, center: Vector, radius: f32, color: Color);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn fill_polygon(&mut self, points: &[Vector], color: Color) {
        (**self).fill_polygon(points, color);
    }

    fn stroke_polyline(&mut self, points: &[Vector], closed: bool, color: Color) {
        (**self).stroke_polyline(points, closed, color);
    }

    fn draw_line(&mut self, from: Vector, to: Vector, color: Color) {
        (**self).draw_line(from, to, color);
    }

    fn fill_circle(&mut self, center: Vector, radius: f32, color: Color) {
        (**self).fill_circle(center, radius, color);
    }
}
