//! Recording surface: captures draw calls as a command stream.
//!
//! Useful for hosts that rasterize on their own side of a boundary, and for
//! inspecting exactly what a frame would draw.

use crate::core::math::Vector;

use super::traits::{Color, Surface};

/// A single recorded draw call, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillPolygon { points: Vec<Vector>, color: Color },
    Polyline { points: Vec<Vector>, closed: bool, color: Color },
    Line { from: Vector, to: Vector, color: Color },
    Circle { center: Vector, radius: f32, color: Color },
}

/// Draw calls recorded for a frame, in submission order.
#[derive(Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop recorded commands. Keeps allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn drain(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.cmds)
    }
}

impl Surface for DrawList {
    fn fill_polygon(&mut self, points: &[Vector], color: Color) {
        self.cmds.push(DrawCmd::FillPolygon { points: points.to_vec(), color });
    }

    fn stroke_polyline(&mut self, points: &[Vector], closed: bool, color: Color) {
        self.cmds.push(DrawCmd::Polyline { points: points.to_vec(), closed, color });
    }

    fn draw_line(&mut self, from: Vector, to: Vector, color: Color) {
        self.cmds.push(DrawCmd::Line { from, to, color });
    }

    fn fill_circle(&mut self, center: Vector, radius: f32, color: Color) {
        self.cmds.push(DrawCmd::Circle { center, radius, color });
    }
}
