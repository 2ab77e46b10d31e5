use serde::{Deserialize, Serialize};

/// Unique identifier for a sprite in a [`World`](crate::core::world::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SpriteId(pub u32);
