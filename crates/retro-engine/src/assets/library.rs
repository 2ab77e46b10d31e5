//! Named sprite geometry, read from storage once and cached by name.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::api::types::SpriteId;
use crate::assets::rso::{self, RsoError};
use crate::components::primitive::Mesh;
use crate::components::sprite::Sprite;

/// File extension of geometry files in a [`DirSource`].
pub const EXTENSION: &str = "rso";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot read geometry `{name}`: {source}")]
    Io { name: String, source: io::Error },
    #[error("invalid geometry `{name}`: {source}")]
    Format { name: String, source: RsoError },
}

impl AssetError {
    pub fn name(&self) -> &str {
        match self {
            AssetError::Io { name, .. } | AssetError::Format { name, .. } => name,
        }
    }
}

/// Where geometry text comes from.
pub trait GeometrySource {
    fn read(&self, name: &str) -> io::Result<String>;
}

/// Reads `<root>/<name>.rso`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{EXTENSION}"))
    }
}

impl GeometrySource for DirSource {
    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.path_for(name))
    }
}

/// In-memory geometry, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }
}

impl GeometrySource for MemorySource {
    fn read(&self, name: &str) -> io::Result<String> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no geometry named `{name}`"))
        })
    }
}

/// Geometry cache in front of a [`GeometrySource`].
///
/// Owned by whoever needs it (normally the render context); there is no
/// process-wide instance.
pub struct SpriteLibrary {
    source: Box<dyn GeometrySource>,
    cache: HashMap<String, Mesh>,
}

impl SpriteLibrary {
    pub fn new(source: impl GeometrySource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: HashMap::new(),
        }
    }

    /// Library reading `<root>/<name>.rso` files.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(DirSource::new(root))
    }

    /// Cached geometry if present, otherwise read, parse, validate and cache.
    pub fn load_mesh(&mut self, name: &str) -> Result<Mesh, AssetError> {
        if let Some(mesh) = self.cache.get(name) {
            debug!("geometry `{}` served from cache", name);
            return Ok(mesh.clone());
        }
        self.read_mesh(name)
    }

    /// Read from storage even if cached, replacing the cache entry on success.
    pub fn reload_mesh(&mut self, name: &str) -> Result<Mesh, AssetError> {
        self.read_mesh(name)
    }

    /// [`load_mesh`](Self::load_mesh) wrapped in a new sprite tagged `name`.
    pub fn load(&mut self, id: SpriteId, name: &str) -> Result<Sprite, AssetError> {
        let mesh = self.load_mesh(name)?;
        Ok(Sprite::from_mesh(id, mesh).with_tag(name))
    }

    /// [`reload_mesh`](Self::reload_mesh) wrapped in a new sprite tagged `name`.
    pub fn reload(&mut self, id: SpriteId, name: &str) -> Result<Sprite, AssetError> {
        let mesh = self.reload_mesh(name)?;
        Ok(Sprite::from_mesh(id, mesh).with_tag(name))
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn cached_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Drop one cache entry. Returns whether it was present.
    pub fn evict(&mut self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn read_mesh(&mut self, name: &str) -> Result<Mesh, AssetError> {
        let text = self.source.read(name).map_err(|source| AssetError::Io {
            name: name.to_string(),
            source,
        })?;
        let mesh = rso::parse(&text)
            .and_then(|data| data.to_mesh().map_err(RsoError::from))
            .map_err(|source| AssetError::Format {
                name: name.to_string(),
                source,
            })?;
        info!(
            "loaded geometry `{}`: {} vertices, {} n-gons, {} triangles",
            name,
            mesh.vertices().len(),
            mesh.ngons().len(),
            mesh.triangles().len()
        );
        self.cache.insert(name.to_string(), mesh.clone());
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const QUAD: &str = "$rso$\nquad\n\n0 1 2\n0 2 3\n\n0 1 2 3\n\n0 0\n1 0\n1 1\n0 1\n";

    /// Counts storage reads so cache hits are observable.
    struct CountingSource {
        inner: MemorySource,
        reads: Rc<Cell<usize>>,
    }

    impl GeometrySource for CountingSource {
        fn read(&self, name: &str) -> io::Result<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read(name)
        }
    }

    fn counting(inner: MemorySource) -> (SpriteLibrary, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let library = SpriteLibrary::new(CountingSource { inner, reads: Rc::clone(&reads) });
        (library, reads)
    }

    #[test]
    fn second_load_hits_cache() {
        let (mut library, reads) = counting(MemorySource::new().with("quad", QUAD));

        let first = library.load_mesh("quad").unwrap();
        let second = library.load_mesh("quad").unwrap();
        assert_eq!(first, second);
        assert_eq!(reads.get(), 1);
        assert!(library.is_cached("quad"));
    }

    #[test]
    fn reload_reads_storage_again() {
        let (mut library, reads) = counting(MemorySource::new().with("quad", QUAD));
        library.load_mesh("quad").unwrap();
        library.reload_mesh("quad").unwrap();
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn missing_geometry_is_io_error() {
        let mut library = SpriteLibrary::new(MemorySource::new());
        let err = library.load(SpriteId(1), "ghost").unwrap_err();
        assert!(matches!(err, AssetError::Io { ref source, .. } if source.kind() == io::ErrorKind::NotFound));
        assert_eq!(err.name(), "ghost");
        assert!(library.cached_names().is_empty());
    }

    #[test]
    fn invalid_geometry_is_not_cached() {
        let broken = QUAD.replace("$rso$", "rso");
        let mut library = SpriteLibrary::new(MemorySource::new().with("quad", broken));
        let err = library.load_mesh("quad").unwrap_err();
        assert!(matches!(err, AssetError::Format { source: RsoError::BadHeader { .. }, .. }));
        assert!(!library.is_cached("quad"));
    }

    #[test]
    fn load_builds_tagged_sprite() {
        let mut library = SpriteLibrary::new(MemorySource::new().with("quad", QUAD));
        let mut sprite = library.load(SpriteId(7), "quad").unwrap();
        assert_eq!(sprite.id, SpriteId(7));
        assert_eq!(sprite.tag, "quad");
        assert_eq!(sprite.vertex_count(), 4);
        assert_eq!(sprite.clips().len(), 2);
    }

    #[test]
    fn evict_and_clear() {
        let mut library = SpriteLibrary::new(MemorySource::new().with("a", QUAD).with("b", QUAD));
        library.load_mesh("a").unwrap();
        library.load_mesh("b").unwrap();
        assert_eq!(library.cached_names(), vec!["a", "b"]);
        assert!(library.evict("a"));
        assert!(!library.evict("a"));
        library.clear();
        assert!(library.cached_names().is_empty());
    }

    #[test]
    fn dir_source_reads_rso_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.rso"), QUAD).unwrap();

        let mut library = SpriteLibrary::from_dir(dir.path());
        let mesh = library.load_mesh("quad").unwrap();
        assert_eq!(mesh.ngons(), &[vec![0, 1, 2, 3]]);
        assert!(library.load_mesh("missing").is_err());
    }
}
