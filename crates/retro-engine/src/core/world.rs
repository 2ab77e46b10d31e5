use log::warn;
use thiserror::Error;

use crate::api::types::SpriteId;
use crate::components::sprite::Sprite;

/// Consistency failures when adding or removing sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("sprite {0:?} is already in the world")]
    Duplicate(SpriteId),
    #[error("sprite {0:?} is not in the world")]
    Missing(SpriteId),
}

/// The set of live sprites, each present at most once.
/// Flat Vec storage; designed for hundreds of sprites, not millions.
pub struct World {
    sprites: Vec<Sprite>,
    /// `None` once the id space is used up.
    next_id: Option<u32>,
}

impl World {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a world with a specific sprite capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(capacity),
            next_id: Some(1),
        }
    }

    /// Generate an id above every id handed out or spawned so far.
    /// `None` once `u32::MAX` has been used.
    pub fn next_id(&mut self) -> Option<SpriteId> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(SpriteId(id))
    }

    /// Add a sprite. Fails if a sprite with the same id is already present.
    pub fn spawn(&mut self, sprite: Sprite) -> Result<SpriteId, WorldError> {
        let id = sprite.id;
        if self.contains(id) {
            warn!("refusing to add sprite {:?} twice", id);
            return Err(WorldError::Duplicate(id));
        }
        if self.next_id.is_some_and(|next| id.0 >= next) {
            self.next_id = id.0.checked_add(1);
        }
        self.sprites.push(sprite);
        Ok(id)
    }

    /// Remove a sprite by id, handing ownership back to the caller.
    /// Fails if the sprite is not present.
    pub fn despawn(&mut self, id: SpriteId) -> Result<Sprite, WorldError> {
        match self.sprites.iter().position(|s| s.id == id) {
            Some(idx) => Ok(self.sprites.swap_remove(idx)),
            None => Err(WorldError::Missing(id)),
        }
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sprite> {
        self.sprites.iter_mut()
    }

    pub fn ids(&self) -> Vec<SpriteId> {
        self.sprites.iter().map(|s| s.id).collect()
    }

    /// Find the first sprite with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.tag == tag)
    }

    /// Find the first sprite with the given tag (mutable).
    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|s| s.tag == tag)
    }

    /// Ids of every other sprite whose world bounds overlap `id`'s.
    pub fn overlapping(&mut self, id: SpriteId) -> Vec<SpriteId> {
        let Some(target) = self.get_mut(id).and_then(|s| s.bounds()) else {
            return Vec::new();
        };
        self.sprites
            .iter_mut()
            .filter(|s| s.id != id)
            .filter_map(|s| {
                let bounds = s.bounds()?;
                bounds.overlaps(&target).then_some(s.id)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::primitive::Primitive;
    use crate::core::math::{Matrix, Vector};

    fn dot(id: SpriteId) -> Sprite {
        Sprite::new(id, vec![Primitive::point(Vector::ZERO)])
    }

    #[test]
    fn spawn_and_get() {
        let mut world = World::new();
        let id = world.next_id().unwrap();
        world.spawn(dot(id).with_tag("ship")).unwrap();
        assert_eq!(world.get(id).unwrap().tag, "ship");
        assert_eq!(world.find_by_tag("ship").unwrap().id, id);
    }

    #[test]
    fn double_add_is_rejected() {
        let mut world = World::new();
        let id = world.next_id().unwrap();
        world.spawn(dot(id)).unwrap();
        assert_eq!(world.spawn(dot(id)).err(), Some(WorldError::Duplicate(id)));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn despawn_removes_exactly_once() {
        let mut world = World::new();
        let id = world.next_id().unwrap();
        world.spawn(dot(id)).unwrap();

        let sprite = world.despawn(id).unwrap();
        assert_eq!(sprite.id, id);
        assert!(world.is_empty());
        assert_eq!(world.despawn(id).err(), Some(WorldError::Missing(id)));
    }

    #[test]
    fn explicit_ids_advance_generator() {
        let mut world = World::new();
        world.spawn(dot(SpriteId(10))).unwrap();
        assert_eq!(world.next_id(), Some(SpriteId(11)));

        // Lower explicit ids leave the generator alone.
        world.spawn(dot(SpriteId(3))).unwrap();
        assert_eq!(world.next_id(), Some(SpriteId(12)));
    }

    #[test]
    fn id_space_exhaustion_yields_none() {
        let mut world = World::new();
        world.spawn(dot(SpriteId(u32::MAX))).unwrap();
        assert_eq!(world.next_id(), None);
        assert_eq!(world.next_id(), None);

        world.spawn(dot(SpriteId(7))).unwrap();
        assert_eq!(world.next_id(), None);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn overlapping_uses_world_bounds() {
        let mut world = World::new();
        let square = |id: SpriteId, dx: f32| {
            Sprite::new(
                id,
                vec![Primitive::polygon([
                    Vector::new(0.0, 0.0),
                    Vector::new(10.0, 0.0),
                    Vector::new(10.0, 10.0),
                    Vector::new(0.0, 10.0),
                ])],
            )
            .with_world(Matrix::translate(dx, 0.0))
        };
        world.spawn(square(SpriteId(1), 0.0)).unwrap();
        world.spawn(square(SpriteId(2), 5.0)).unwrap();
        world.spawn(square(SpriteId(3), 50.0)).unwrap();

        assert_eq!(world.overlapping(SpriteId(1)), vec![SpriteId(2)]);
        assert!(world.overlapping(SpriteId(3)).is_empty());
        assert!(world.overlapping(SpriteId(99)).is_empty());
    }
}
