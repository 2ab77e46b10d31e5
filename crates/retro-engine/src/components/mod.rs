pub mod primitive;
pub mod sprite;
