//! Geometry primitives: the closed set of shapes a sprite can be built from.

use thiserror::Error;

use crate::core::math::Vector;
use crate::renderer::traits::{Color, Surface};

/// Reasons a mesh (vertices + n-gons + triangles) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    NoVertices,
    #[error("mesh has no n-gons")]
    NoNgons,
    #[error("mesh has no triangles")]
    NoTriangles,
    #[error("n-gon {index} has {len} vertices, at least 3 required")]
    DegenerateNgon { index: usize, len: usize },
    #[error("triangle row {index} has {len} indices, at least 3 required")]
    DegenerateTriangle { index: usize, len: usize },
    #[error("expected {expected} triangle rows for the given n-gons, found {found}")]
    TriangleCountMismatch { expected: usize, found: usize },
    #[error("vertex index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange { index: usize, vertex_count: usize },
}

/// Fan-triangulate each n-gon: `(i0, ik, ik+1)` for every k.
pub fn fan_triangulate(ngons: &[Vec<usize>]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(fan_triangle_count(ngons));
    for ngon in ngons {
        if let Some((&first, rest)) = ngon.split_first() {
            for pair in rest.windows(2) {
                triangles.push([first, pair[0], pair[1]]);
            }
        }
    }
    triangles
}

/// `Σ (len(ngon) - 2)` over all n-gons.
pub fn fan_triangle_count(ngons: &[Vec<usize>]) -> usize {
    ngons.iter().map(|n| n.len().saturating_sub(2)).sum()
}

/// Indexed polygon mesh with pre-triangulated fill.
///
/// N-gon and triangle entries are offsets into `vertices`. A triangle row
/// normally holds three indices; a wider row is fanned from its first index
/// when resolved into fill triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vector>,
    ngons: Vec<Vec<usize>>,
    triangles: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(
        vertices: Vec<Vector>,
        ngons: Vec<Vec<usize>>,
        triangles: Vec<Vec<usize>>,
    ) -> Result<Self, MeshError> {
        validate(vertices.len(), &ngons, &triangles)?;
        Ok(Self { vertices, ngons, triangles })
    }

    /// Build a mesh whose triangles are the fan triangulation of `ngons`.
    pub fn from_ngons(vertices: Vec<Vector>, ngons: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        let triangles = fan_triangulate(&ngons).into_iter().map(Vec::from).collect();
        Self::new(vertices, ngons, triangles)
    }

    pub fn vertices(&self) -> &[Vector] {
        &self.vertices
    }

    pub fn ngons(&self) -> &[Vec<usize>] {
        &self.ngons
    }

    /// Triangle rows as stored.
    pub fn triangles(&self) -> &[Vec<usize>] {
        &self.triangles
    }

    /// Fill triangles: every triangle row fanned into index triples.
    pub fn fill_triangles(&self) -> Vec<[usize; 3]> {
        fan_triangulate(&self.triangles)
    }
}

/// Topology checks shared by [`Mesh::new`] and the geometry loader.
pub fn validate(
    vertex_count: usize,
    ngons: &[Vec<usize>],
    triangles: &[Vec<usize>],
) -> Result<(), MeshError> {
    if vertex_count == 0 {
        return Err(MeshError::NoVertices);
    }
    if ngons.is_empty() {
        return Err(MeshError::NoNgons);
    }
    if triangles.is_empty() {
        return Err(MeshError::NoTriangles);
    }
    if let Some((index, ngon)) = ngons.iter().enumerate().find(|(_, n)| n.len() < 3) {
        return Err(MeshError::DegenerateNgon { index, len: ngon.len() });
    }
    if let Some((index, row)) = triangles.iter().enumerate().find(|(_, t)| t.len() < 3) {
        return Err(MeshError::DegenerateTriangle { index, len: row.len() });
    }
    let expected = fan_triangle_count(ngons);
    if triangles.len() != expected {
        return Err(MeshError::TriangleCountMismatch { expected, found: triangles.len() });
    }
    let out_of_range = ngons
        .iter()
        .flatten()
        .chain(triangles.iter().flatten())
        .find(|&&i| i >= vertex_count);
    if let Some(&index) = out_of_range {
        return Err(MeshError::IndexOutOfRange { index, vertex_count });
    }
    Ok(())
}

/// Discriminant of [`Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Point,
    Line,
    LineLoop,
    Polygon,
    Mesh,
}

/// Drawing parameters that are not part of the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    /// Radius of the filled circle drawn for a point.
    pub point_radius: f32,
    pub fill: Color,
    pub outline: Color,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            point_radius: 2.0,
            fill: Color::FILL,
            outline: Color::OUTLINE,
        }
    }
}

/// A shape in sprite-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Point(Vector),
    Line([Vector; 2]),
    /// Closed outline.
    LineLoop(Vec<Vector>),
    /// Filled, with a closed outline.
    Polygon(Vec<Vector>),
    Mesh(Mesh),
}

impl Primitive {
    pub fn point(at: Vector) -> Self {
        Primitive::Point(at)
    }

    pub fn line(from: Vector, to: Vector) -> Self {
        Primitive::Line([from, to])
    }

    pub fn line_loop(vertices: impl IntoIterator<Item = Vector>) -> Self {
        Primitive::LineLoop(vertices.into_iter().collect())
    }

    pub fn polygon(vertices: impl IntoIterator<Item = Vector>) -> Self {
        Primitive::Polygon(vertices.into_iter().collect())
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Point(_) => PrimitiveKind::Point,
            Primitive::Line(_) => PrimitiveKind::Line,
            Primitive::LineLoop(_) => PrimitiveKind::LineLoop,
            Primitive::Polygon(_) => PrimitiveKind::Polygon,
            Primitive::Mesh(_) => PrimitiveKind::Mesh,
        }
    }

    /// Local-space vertices, in the order `draw` expects their transforms.
    pub fn vertices(&self) -> &[Vector] {
        match self {
            Primitive::Point(v) => std::slice::from_ref(v),
            Primitive::Line(vs) => vs.as_slice(),
            Primitive::LineLoop(vs) | Primitive::Polygon(vs) => vs.as_slice(),
            Primitive::Mesh(mesh) => mesh.vertices(),
        }
    }

    /// Local-space triangles as index triples into `vertices()`.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        match self {
            Primitive::Polygon(vs) if vs.len() >= 3 => {
                let ngon: Vec<usize> = (0..vs.len()).collect();
                fan_triangulate(&[ngon])
            }
            Primitive::Mesh(mesh) => mesh.fill_triangles(),
            _ => Vec::new(),
        }
    }

    /// Draw using already-transformed vertices.
    ///
    /// `screen` must hold exactly one point per entry of `vertices()`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, screen: &[Vector], style: &DrawStyle) {
        debug_assert_eq!(screen.len(), self.vertices().len());
        match self {
            Primitive::Point(_) => {
                if let Some(&center) = screen.first() {
                    surface.fill_circle(center, style.point_radius, style.outline);
                }
            }
            Primitive::Line(_) => {
                if let [from, to] = screen {
                    surface.draw_line(*from, *to, style.outline);
                }
            }
            Primitive::LineLoop(_) => surface.stroke_polyline(screen, true, style.outline),
            Primitive::Polygon(_) => {
                surface.fill_polygon(screen, style.fill);
                surface.stroke_polyline(screen, true, style.outline);
            }
            Primitive::Mesh(mesh) => {
                let mut points = Vec::new();
                for ngon in mesh.ngons() {
                    points.clear();
                    points.extend(ngon.iter().map(|&i| screen[i]));
                    surface.fill_polygon(&points, style.fill);
                    surface.stroke_polyline(&points, true, style.outline);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::draw_list::{DrawCmd, DrawList};

    fn square() -> Vec<Vector> {
        vec![
            Vector::new(0.0, 0.0),
            Vector::new(1.0, 0.0),
            Vector::new(1.0, 1.0),
            Vector::new(0.0, 1.0),
        ]
    }

    #[test]
    fn fan_triangulation_counts() {
        let ngons = vec![vec![0, 1, 2, 3], vec![0, 1, 2]];
        let tris = fan_triangulate(&ngons);
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3], [0, 1, 2]]);
        assert_eq!(fan_triangle_count(&ngons), 3);
    }

    #[test]
    fn mesh_validation() {
        assert_eq!(Mesh::from_ngons(Vec::new(), vec![vec![0, 1, 2]]), Err(MeshError::NoVertices));
        assert_eq!(Mesh::from_ngons(square(), Vec::new()), Err(MeshError::NoNgons));
        assert_eq!(Mesh::new(square(), vec![vec![0, 1, 2]], Vec::new()), Err(MeshError::NoTriangles));
        assert_eq!(
            Mesh::new(square(), vec![vec![0, 1, 2, 3]], vec![vec![0, 1, 2], vec![0, 2]]),
            Err(MeshError::DegenerateTriangle { index: 1, len: 2 })
        );
        assert_eq!(
            Mesh::new(square(), vec![vec![0, 1, 2, 3]], vec![vec![0, 1, 2]]),
            Err(MeshError::TriangleCountMismatch { expected: 2, found: 1 })
        );
        assert_eq!(
            Mesh::from_ngons(square(), vec![vec![0, 1, 9]]),
            Err(MeshError::IndexOutOfRange { index: 9, vertex_count: 4 })
        );
        assert!(Mesh::from_ngons(square(), vec![vec![0, 1, 2, 3]]).is_ok());
    }

    #[test]
    fn polygon_draws_fill_then_outline() {
        let poly = Primitive::polygon(square());
        let mut list = DrawList::new();
        poly.draw(&mut list, poly.vertices(), &DrawStyle::default());

        assert_eq!(list.len(), 2);
        assert!(matches!(&list.cmds()[0], DrawCmd::FillPolygon { color, .. } if *color == Color::FILL));
        assert!(matches!(&list.cmds()[1], DrawCmd::Polyline { closed: true, color, .. } if *color == Color::OUTLINE));
    }

    #[test]
    fn mesh_draws_each_ngon() {
        let verts = vec![
            Vector::new(0.0, 0.0),
            Vector::new(1.0, 0.0),
            Vector::new(1.0, 1.0),
            Vector::new(0.0, 1.0),
            Vector::new(2.0, 0.0),
        ];
        let mesh = Mesh::from_ngons(verts, vec![vec![0, 1, 2, 3], vec![1, 4, 2]]).unwrap();
        let prim = Primitive::Mesh(mesh);
        let mut list = DrawList::new();
        prim.draw(&mut list, prim.vertices(), &DrawStyle::default());

        assert_eq!(list.len(), 4);
        match &list.cmds()[2] {
            DrawCmd::FillPolygon { points, .. } => {
                assert_eq!(points, &vec![Vector::new(1.0, 0.0), Vector::new(2.0, 0.0), Vector::new(1.0, 1.0)]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn point_and_line_dispatch() {
        let style = DrawStyle { point_radius: 4.0, ..DrawStyle::default() };
        let mut list = DrawList::new();

        let point = Primitive::point(Vector::new(3.0, 3.0));
        point.draw(&mut list, point.vertices(), &style);
        let line = Primitive::line(Vector::ZERO, Vector::new(5.0, 0.0));
        line.draw(&mut list, line.vertices(), &style);
        let lp = Primitive::line_loop(square());
        lp.draw(&mut list, lp.vertices(), &style);

        assert!(matches!(list.cmds()[0], DrawCmd::Circle { radius, .. } if radius == 4.0));
        assert!(matches!(list.cmds()[1], DrawCmd::Line { .. }));
        assert!(matches!(list.cmds()[2], DrawCmd::Polyline { closed: true, .. }));
        assert_eq!(lp.kind(), PrimitiveKind::LineLoop);
    }

    #[test]
    fn polygon_triangles_fan_from_first_vertex() {
        let poly = Primitive::polygon(square());
        assert_eq!(poly.triangles(), vec![[0, 1, 2], [0, 2, 3]]);
        assert!(Primitive::line(Vector::ZERO, Vector::ZERO).triangles().is_empty());
    }

    #[test]
    fn wide_triangle_rows_fan_into_fill_triangles() {
        let mesh = Mesh::new(square(), vec![vec![0, 1, 2, 3]], vec![vec![0, 1, 2, 3], vec![0, 2, 3]]).unwrap();
        assert_eq!(mesh.fill_triangles(), vec![[0, 1, 2], [0, 2, 3], [0, 2, 3]]);
        assert_eq!(Primitive::Mesh(mesh).triangles().len(), 3);
    }
}
