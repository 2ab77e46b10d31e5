//! Lyon-backed [`Surface`]: tessellates every draw call into a flat,
//! GPU-ready triangle list.
//!
//! ```ignore
//! let mut ctx = RenderContext::new(config.clone(), VectorSurface::from_config(&config));
//! let camera = ctx.camera();
//! ctx.draw(&camera, &mut world);
//! upload(bytemuck::cast_slice(ctx.surface().vertices()));
//! ```

use bytemuck::{Pod, Zeroable};
use log::debug;
use lyon::math::point;
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::api::config::EngineConfig;
use crate::core::math::Vector;
use crate::renderer::traits::{Color, Surface};

/// Per-vertex data for the tessellated output.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 6;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 24

    fn at(x: f32, y: f32, color: Color) -> Self {
        Self { x, y, r: color.r, g: color.g, b: color.b, a: color.a }
    }
}

struct FillVertexCtor {
    color: Color,
}

impl FillVertexConstructor<VectorVertex> for FillVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        let p = vertex.position();
        VectorVertex::at(p.x, p.y, self.color)
    }
}

struct StrokeVertexCtor {
    color: Color,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        let p = vertex.position();
        VectorVertex::at(p.x, p.y, self.color)
    }
}

/// Surface that tessellates with lyon.
///
/// Holds the tessellators and the output triangle list. Clear it at the
/// start of each frame.
pub struct VectorSurface {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    vertices: Vec<VectorVertex>,
    tolerance: f32,
    line_width: f32,
}

impl VectorSurface {
    pub fn new(tolerance: f32, line_width: f32) -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            vertices: Vec::with_capacity(4096),
            tolerance,
            line_width,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.tessellation_tolerance, config.line_width)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangle list, three vertices per triangle.
    pub fn vertices(&self) -> &[VectorVertex] {
        &self.vertices
    }

    /// The triangle list as raw floats.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Unindex lyon's output into the triangle list.
    fn flush_geometry(&mut self) {
        let VertexBuffers { vertices, indices } = &mut self.geometry;
        self.vertices
            .extend(indices.iter().map(|&idx| vertices[idx as usize]));
        vertices.clear();
        indices.clear();
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(self.tolerance),
            &mut BuffersBuilder::new(&mut self.geometry, FillVertexCtor { color }),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                debug!("fill tessellation failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, color: Color) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(self.tolerance).with_line_width(self.line_width),
            &mut BuffersBuilder::new(&mut self.geometry, StrokeVertexCtor { color }),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                debug!("stroke tessellation failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

impl Default for VectorSurface {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

fn polyline_path(points: &[Vector], closed: bool) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(points[0].x(), points[0].y()));
    for p in &points[1..] {
        builder.line_to(point(p.x(), p.y()));
    }
    builder.end(closed);
    builder.build()
}

impl Surface for VectorSurface {
    fn fill_polygon(&mut self, points: &[Vector], color: Color) {
        if points.len() < 3 {
            return;
        }
        let path = polyline_path(points, true);
        self.fill_path(&path, color);
    }

    fn stroke_polyline(&mut self, points: &[Vector], closed: bool, color: Color) {
        if points.len() < 2 {
            return;
        }
        let path = polyline_path(points, closed);
        self.stroke_path(&path, color);
    }

    fn draw_line(&mut self, from: Vector, to: Vector, color: Color) {
        self.stroke_polyline(&[from, to], false, color);
    }

    fn fill_circle(&mut self, center: Vector, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.add_circle(point(center.x(), center.y()), radius, Winding::Positive);
        let path = builder.build();
        self.fill_path(&path, color);
    }
}
