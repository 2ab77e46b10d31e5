pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod extensions;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::context::RenderContext;
pub use api::types::SpriteId;
pub use assets::library::{AssetError, DirSource, GeometrySource, MemorySource, SpriteLibrary};
pub use assets::rso::{MeshData, RsoError};
pub use components::primitive::{DrawStyle, Mesh, MeshError, Primitive, PrimitiveKind};
pub use components::sprite::{CacheState, CacheStats, Sprite};
pub use core::geometry::{Bounds, Intersection};
pub use core::math::{Matrix, Vector};
pub use core::world::{World, WorldError};
pub use renderer::camera::Camera;
pub use renderer::draw_list::{DrawCmd, DrawList};
pub use renderer::traits::{Color, Surface};

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorSurface, VectorVertex};

pub use extensions::TransformGraph;
