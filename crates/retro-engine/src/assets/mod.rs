pub mod library;
pub mod rso;

pub use library::{AssetError, DirSource, GeometrySource, MemorySource, SpriteLibrary};
pub use rso::{MeshData, RsoError};
