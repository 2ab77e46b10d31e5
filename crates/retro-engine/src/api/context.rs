use log::{info, warn};

use crate::api::config::EngineConfig;
use crate::api::types::SpriteId;
use crate::assets::library::{GeometrySource, SpriteLibrary};
use crate::components::sprite::Sprite;
use crate::core::world::World;
use crate::renderer::camera::Camera;
use crate::renderer::traits::Surface;

/// Everything a frame needs that lives for the whole run: the destination
/// surface, the geometry cache and the config.
///
/// Created once at startup and torn down with [`into_surface`](Self::into_surface).
/// Components borrow it explicitly; nothing here is global.
pub struct RenderContext<S: Surface> {
    surface: S,
    sprites: SpriteLibrary,
    config: EngineConfig,
}

impl<S: Surface> RenderContext<S> {
    /// Context reading geometry from `config.asset_dir`.
    pub fn new(config: EngineConfig, surface: S) -> Self {
        let sprites = SpriteLibrary::from_dir(config.asset_dir.clone());
        info!(
            "render context up: {}x{}, assets in {}",
            config.screen_width,
            config.screen_height,
            config.asset_dir.display()
        );
        Self { surface, sprites, config }
    }

    /// Context reading geometry from an arbitrary source.
    pub fn with_source(
        config: EngineConfig,
        surface: S,
        source: impl GeometrySource + 'static,
    ) -> Self {
        Self {
            surface,
            sprites: SpriteLibrary::new(source),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sprites(&self) -> &SpriteLibrary {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteLibrary {
        &mut self.sprites
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// A camera sized and zoomed per the config.
    pub fn camera(&self) -> Camera {
        Camera::from_config(&self.config)
    }

    /// Sprite built from cached or freshly read geometry.
    /// A missing or malformed file is logged and yields `None`.
    pub fn load_sprite(&mut self, id: SpriteId, name: &str) -> Option<Sprite> {
        self.sprites
            .load(id, name)
            .map_err(|e| warn!("{}", e))
            .ok()
    }

    /// Like [`load_sprite`](Self::load_sprite) but always reads storage.
    pub fn reload_sprite(&mut self, id: SpriteId, name: &str) -> Option<Sprite> {
        self.sprites
            .reload(id, name)
            .map_err(|e| warn!("{}", e))
            .ok()
    }

    /// Load `name` under the world's next id and add it to the world.
    pub fn spawn_sprite(&mut self, world: &mut World, name: &str) -> Option<SpriteId> {
        let Some(id) = world.next_id() else {
            warn!("no sprite ids left, cannot spawn `{}`", name);
            return None;
        };
        let sprite = self.load_sprite(id, name)?;
        world.spawn(sprite).map_err(|e| warn!("{}", e)).ok()
    }

    pub fn draw(&mut self, camera: &Camera, world: &mut World) {
        camera.draw(world, &mut self.surface);
    }

    /// Shut the context down, handing back the surface.
    pub fn into_surface(self) -> S {
        info!("render context down, {} geometries cached", self.sprites.cached_names().len());
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::library::MemorySource;
    use crate::core::math::{Matrix, Vector};
    use crate::renderer::draw_list::{DrawCmd, DrawList};

    const DART: &str = "$rso$\ndart\n\n0 1 2\n\n0 1 2\n\n0 1\n-1 -1\n1 -1\n";

    fn context() -> RenderContext<DrawList> {
        let source = MemorySource::new().with("dart", DART);
        RenderContext::with_source(EngineConfig::default(), DrawList::new(), source)
    }

    #[test]
    fn load_sprite_caches_geometry() {
        let mut ctx = context();
        let sprite = ctx.load_sprite(SpriteId(1), "dart").unwrap();
        assert_eq!(sprite.vertex_count(), 3);
        assert!(ctx.sprites().is_cached("dart"));
        assert!(ctx.reload_sprite(SpriteId(2), "dart").is_some());
    }

    #[test]
    fn missing_sprite_is_none() {
        let mut ctx = context();
        assert!(ctx.load_sprite(SpriteId(1), "nope").is_none());
        assert!(ctx.sprites().cached_names().is_empty());
    }

    #[test]
    fn spawn_uses_world_ids() {
        let mut ctx = context();
        let mut world = World::new();
        let a = ctx.spawn_sprite(&mut world, "dart").unwrap();
        let b = ctx.spawn_sprite(&mut world, "dart").unwrap();
        assert_ne!(a, b);
        assert_eq!(world.len(), 2);
        assert!(ctx.spawn_sprite(&mut world, "nope").is_none());
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn spawn_fails_cleanly_without_ids() {
        let mut ctx = context();
        let mut world = World::new();
        let last = ctx.load_sprite(SpriteId(u32::MAX), "dart").unwrap();
        world.spawn(last).unwrap();

        assert!(ctx.spawn_sprite(&mut world, "dart").is_none());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn draw_records_into_surface() {
        let mut ctx = context();
        let mut world = World::new();
        let id = ctx.spawn_sprite(&mut world, "dart").unwrap();
        world
            .get_mut(id)
            .unwrap()
            .set_world(Matrix::translate(1.0, 0.0));

        let camera = ctx.camera();
        ctx.draw(&camera, &mut world);

        let list = ctx.into_surface();
        // One n-gon: a fill and its outline.
        assert_eq!(list.len(), 2);
        match &list.cmds()[0] {
            DrawCmd::FillPolygon { points, .. } => {
                assert_eq!(points.len(), 3);
                assert_eq!(points[0], camera.project(Vector::new(1.0, 1.0)));
            }
            other => panic!("expected a fill, got {other:?}"),
        }
    }

    #[test]
    fn camera_follows_config() {
        let config = EngineConfig { screen_width: 200.0, screen_height: 100.0, ..EngineConfig::default() };
        let ctx = RenderContext::with_source(config, DrawList::new(), MemorySource::new());
        let camera = ctx.camera();
        assert_eq!(camera.project(Vector::ZERO), Vector::new(100.0, 50.0));
        assert_eq!(camera.zoom(), 12.0);
    }
}
