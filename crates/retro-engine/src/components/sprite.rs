//! Sprites: geometry plus a local and a world transform, with cached
//! transformed vertices at each stage of the pipeline.
//!
//! Stages, each with its own [`CacheState`]:
//!
//! ```text
//! local vertices --local--> transformed --world--> world --view--> screen
//!                                                   |
//!                                                   +--> clips, bounds
//! ```
//!
//! Only `apply_local`, `set_local`, `apply_world` and `set_world` invalidate.
//! A stage rebuilt on read marks the stages after it dirty.

use std::ops::Range;

use log::debug;

use crate::api::types::SpriteId;
use crate::components::primitive::{DrawStyle, Mesh, Primitive};
use crate::core::geometry::{point_in_triangle, Bounds};
use crate::core::math::{Matrix, Vector};
use crate::renderer::traits::Surface;

/// Freshness of one cached buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Clean,
    Dirty,
}

/// How many times each cached stage has been rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub transform_passes: u32,
    pub world_passes: u32,
    pub screen_passes: u32,
    pub clip_passes: u32,
}

/// Vertices derived from an input buffer by one matrix.
#[derive(Debug, Clone)]
struct VertexCache {
    vertices: Vec<Vector>,
    state: CacheState,
    /// The matrix `vertices` were produced with.
    source: Option<Matrix>,
}

impl VertexCache {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            state: CacheState::Dirty,
            source: None,
        }
    }

    fn invalidate(&mut self) {
        self.state = CacheState::Dirty;
    }

    /// Keys compare bit-for-bit, not with `Matrix`'s tolerance.
    fn is_current(&self, matrix: &Matrix) -> bool {
        self.state == CacheState::Clean
            && self.source.map(|m| m.as_mat3()) == Some(matrix.as_mat3())
    }

    fn rebuild(&mut self, matrix: Matrix, input: &[Vector]) {
        self.vertices.clear();
        self.vertices.extend(input.iter().map(|&v| matrix * v));
        self.source = Some(matrix);
        self.state = CacheState::Clean;
    }
}

/// A drawable made of one or more primitives sharing a pose.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: SpriteId,
    /// String tag for finding sprites by name.
    pub tag: String,
    /// Hidden sprites keep their caches but are skipped when drawing.
    pub visible: bool,
    primitives: Vec<Primitive>,
    /// Slice of the flat vertex buffers owned by each primitive.
    ranges: Vec<Range<usize>>,
    local_vertices: Vec<Vector>,
    /// Fill triangles, indexing the flat buffers.
    triangles: Vec<[usize; 3]>,
    local: Matrix,
    world: Matrix,
    transformed: VertexCache,
    world_vertices: VertexCache,
    screen: VertexCache,
    clips: Vec<[Vector; 3]>,
    clip_state: CacheState,
    bounds: Option<Bounds>,
    stats: CacheStats,
}

impl Sprite {
    /// Create a sprite with identity local and world transforms.
    pub fn new(id: SpriteId, primitives: Vec<Primitive>) -> Self {
        let mut ranges = Vec::with_capacity(primitives.len());
        let mut local_vertices = Vec::new();
        let mut triangles = Vec::new();
        for primitive in &primitives {
            let start = local_vertices.len();
            local_vertices.extend_from_slice(primitive.vertices());
            triangles.extend(
                primitive
                    .triangles()
                    .into_iter()
                    .map(|[a, b, c]| [start + a, start + b, start + c]),
            );
            ranges.push(start..local_vertices.len());
        }

        Self {
            id,
            tag: String::new(),
            visible: true,
            primitives,
            ranges,
            local_vertices,
            triangles,
            local: Matrix::IDENTITY,
            world: Matrix::IDENTITY,
            transformed: VertexCache::new(),
            world_vertices: VertexCache::new(),
            screen: VertexCache::new(),
            clips: Vec::new(),
            clip_state: CacheState::Dirty,
            bounds: None,
            stats: CacheStats::default(),
        }
    }

    pub fn from_mesh(id: SpriteId, mesh: Mesh) -> Self {
        Self::new(id, vec![Primitive::Mesh(mesh)])
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_local(mut self, local: Matrix) -> Self {
        self.set_local(local);
        self
    }

    pub fn with_world(mut self, world: Matrix) -> Self {
        self.set_world(world);
        self
    }

    // -- Transforms --

    pub fn local(&self) -> Matrix {
        self.local
    }

    pub fn world(&self) -> Matrix {
        self.world
    }

    /// `local <- local * m`: `m` acts in the sprite's own frame.
    pub fn apply_local(&mut self, m: Matrix) {
        self.local = self.local * m;
        self.transformed.invalidate();
    }

    pub fn set_local(&mut self, m: Matrix) {
        self.local = m;
        self.transformed.invalidate();
    }

    /// `world <- world * m`.
    pub fn apply_world(&mut self, m: Matrix) {
        self.world = self.world * m;
        self.world_vertices.invalidate();
    }

    pub fn set_world(&mut self, m: Matrix) {
        self.world = m;
        self.world_vertices.invalidate();
    }

    // -- Geometry --

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn vertex_count(&self) -> usize {
        self.local_vertices.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Local vertices multiplied by the local transform.
    pub fn transformed_vertices(&mut self) -> &[Vector] {
        self.refresh_transformed();
        &self.transformed.vertices
    }

    /// Transformed vertices multiplied by the world transform.
    pub fn world_vertices(&mut self) -> &[Vector] {
        self.refresh_world();
        &self.world_vertices.vertices
    }

    /// Screen vertices from the most recent draw. Empty before the first draw.
    pub fn screen_vertices(&self) -> &[Vector] {
        &self.screen.vertices
    }

    /// World-space bounding box, `None` for a sprite without vertices.
    pub fn bounds(&mut self) -> Option<Bounds> {
        self.refresh_world();
        self.bounds
    }

    /// Fill triangles resolved to world-space vertex triples.
    pub fn clips(&mut self) -> &[[Vector; 3]] {
        self.refresh_clips();
        &self.clips
    }

    /// Largest distance of a transformed vertex from the local origin.
    pub fn radius(&mut self) -> f32 {
        self.transformed_vertices()
            .iter()
            .map(|v| v.magnitude())
            .fold(0.0, f32::max)
    }

    /// Broad-phase test: world bounding boxes overlap.
    pub fn overlaps(&mut self, other: &mut Sprite) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Whether a world-space point falls inside any fill triangle.
    pub fn contains_point(&mut self, p: Vector) -> bool {
        if !self.bounds().is_some_and(|b| b.contains(p)) {
            return false;
        }
        self.clips()
            .iter()
            .any(|&[a, b, c]| point_in_triangle(a, b, c, p))
    }

    /// Refresh the transformed, world, clip and bounds stages.
    pub fn update(&mut self) {
        self.refresh_clips();
    }

    /// Draw every primitive with `view * world * local`.
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, view: &Matrix, style: &DrawStyle) {
        if !self.visible {
            return;
        }
        self.refresh_screen(view);
        for (primitive, range) in self.primitives.iter().zip(&self.ranges) {
            primitive.draw(surface, &self.screen.vertices[range.clone()], style);
        }
    }

    fn refresh_transformed(&mut self) {
        if self.transformed.is_current(&self.local) {
            return;
        }
        self.transformed.rebuild(self.local, &self.local_vertices);
        self.stats.transform_passes += 1;
        self.world_vertices.invalidate();
    }

    fn refresh_world(&mut self) {
        self.refresh_transformed();
        if self.world_vertices.is_current(&self.world) {
            return;
        }
        self.world_vertices.rebuild(self.world, &self.transformed.vertices);
        self.stats.world_passes += 1;
        self.bounds = Bounds::from_points(&self.world_vertices.vertices);
        self.clip_state = CacheState::Dirty;
        self.screen.invalidate();
        debug!("sprite {:?}: world vertices rebuilt", self.id);
    }

    fn refresh_screen(&mut self, view: &Matrix) {
        self.refresh_world();
        if self.screen.is_current(view) {
            return;
        }
        self.screen.rebuild(*view, &self.world_vertices.vertices);
        self.stats.screen_passes += 1;
    }

    fn refresh_clips(&mut self) {
        self.refresh_world();
        if self.clip_state == CacheState::Clean {
            return;
        }
        let world = &self.world_vertices.vertices;
        self.clips.clear();
        self.clips
            .extend(self.triangles.iter().map(|&[a, b, c]| [world[a], world[b], world[c]]));
        self.clip_state = CacheState::Clean;
        self.stats.clip_passes += 1;
    }
}
