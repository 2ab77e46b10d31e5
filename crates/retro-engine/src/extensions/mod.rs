// extensions/mod.rs
//
// Optional extension modules. Decoupled from Sprite/World: callers opt in
// by creating these alongside their World.

pub mod transform;

pub use transform::TransformGraph;
