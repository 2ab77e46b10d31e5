// extensions/transform.rs
//
// Transform hierarchy extension: parent/child relationships by SpriteId.
// Lives next to the World, never inside it.
//
// Usage:
//   let mut graph = TransformGraph::new();
//   graph.register_with(turret, Matrix::translate(0.0, 1.5));
//   graph.set_parent(turret, Some(hull));
//   graph.propagate(&mut world);  // turret.world = hull.world * hull.local * offset

use std::collections::HashMap;

use log::warn;

use crate::api::types::SpriteId;
use crate::core::math::Matrix;
use crate::core::world::World;

#[derive(Debug, Clone)]
struct TransformNode {
    parent: Option<SpriteId>,
    children: Vec<SpriteId>,
    /// Placement relative to the parent's full frame.
    offset: Matrix,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            offset: Matrix::IDENTITY,
        }
    }
}

/// Parent/child hierarchy over sprites.
///
/// A child's world transform is derived from its parent's world and local
/// transforms and its own offset. Roots keep whatever world transform they
/// already have.
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: HashMap<SpriteId, TransformNode>,
    /// Sprites with no parent, in registration order.
    roots: Vec<SpriteId>,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sprite as a root with an identity offset.
    pub fn register(&mut self, id: SpriteId) {
        self.register_with(id, Matrix::IDENTITY);
    }

    /// Register a sprite with a specific offset. An already linked sprite
    /// keeps its parent.
    pub fn register_with(&mut self, id: SpriteId, offset: Matrix) {
        self.node_mut(id).offset = offset;
    }

    /// Set the parent of a sprite. Pass `None` to make it a root.
    ///
    /// Returns `false` and leaves the graph untouched if the link would
    /// make a sprite its own ancestor.
    pub fn set_parent(&mut self, child: SpriteId, parent: Option<SpriteId>) -> bool {
        let Some(parent) = parent else {
            self.detach(child);
            self.node_mut(child);
            return true;
        };
        if parent == child || self.is_ancestor(child, parent) {
            warn!("refusing to parent {:?} under {:?}: cycle", child, parent);
            return false;
        }

        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.roots.retain(|&r| r != child);
        true
    }

    /// Whether `ancestor` sits somewhere above `id`.
    pub fn is_ancestor(&self, ancestor: SpriteId, id: SpriteId) -> bool {
        let mut cursor = self.get_parent(id);
        while let Some(p) = cursor {
            if p == ancestor {
                return true;
            }
            cursor = self.get_parent(p);
        }
        false
    }

    pub fn set_offset(&mut self, id: SpriteId, offset: Matrix) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.offset = offset;
        }
    }

    pub fn get_offset(&self, id: SpriteId) -> Option<Matrix> {
        self.nodes.get(&id).map(|n| n.offset)
    }

    pub fn get_parent(&self, id: SpriteId) -> Option<SpriteId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn get_children(&self, id: SpriteId) -> Option<&[SpriteId]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    pub fn roots(&self) -> &[SpriteId] {
        &self.roots
    }

    /// Remove a sprite from the hierarchy. Its children become roots.
    pub fn remove(&mut self, id: SpriteId) {
        self.detach(id);
        self.roots.retain(|&r| r != id);
        let Some(node) = self.nodes.remove(&id) else { return };
        for child in node.children {
            self.detach(child);
        }
    }

    /// Derive every child's world transform from its parent's current
    /// frame, starting from the roots. Call after moving any sprite in the
    /// hierarchy; children whose derived transform is unchanged are left
    /// untouched.
    pub fn propagate(&self, world: &mut World) {
        for &root in &self.roots {
            self.propagate_recursive(root, None, world);
        }
    }

    fn propagate_recursive(&self, id: SpriteId, parent_frame: Option<Matrix>, world: &mut World) {
        let Some(node) = self.nodes.get(&id) else { return };

        // A sprite missing from the world breaks the chain below it.
        let frame = world.get_mut(id).map(|sprite| {
            if let Some(parent_frame) = parent_frame {
                let derived = parent_frame * node.offset;
                if sprite.world() != derived {
                    sprite.set_world(derived);
                }
            }
            sprite.world() * sprite.local()
        });

        for &child in &node.children {
            self.propagate_recursive(child, frame, world);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Node for `id`, created as a root if unknown.
    fn node_mut(&mut self, id: SpriteId) -> &mut TransformNode {
        if !self.nodes.contains_key(&id) {
            self.roots.push(id);
        }
        self.nodes.entry(id).or_default()
    }

    /// Unlink `id` from its parent, turning it into a root. No-op for
    /// unknown sprites and existing roots.
    fn detach(&mut self, id: SpriteId) {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|&c| c != id);
        }
        self.roots.push(id);
    }
}
