pub mod camera;
pub mod draw_list;
pub mod traits;

pub use camera::Camera;
pub use draw_list::{DrawCmd, DrawList};
pub use traits::{Color, Surface};
