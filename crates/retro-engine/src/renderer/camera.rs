use log::{debug, warn};

use crate::api::config::EngineConfig;
use crate::components::primitive::DrawStyle;
use crate::core::geometry::Bounds;
use crate::core::math::{Matrix, Vector};
use crate::core::world::World;
use crate::renderer::traits::Surface;

/// View transform from world space to screen space.
///
/// The view is rebuilt eagerly whenever zoom, focus or screen size change:
/// `translate(screen_center) * scale(zoom) * translate(-focus)`, which puts
/// the focus point at the center of the screen. `set_view` and `apply_view`
/// adjust the matrix directly until the next rebuild.
#[derive(Debug, Clone)]
pub struct Camera {
    view: Matrix,
    /// Screen pixels per world unit.
    zoom: f32,
    /// World point shown at the screen center.
    focus: Vector,
    screen_width: f32,
    screen_height: f32,
    /// Smoothing factor for `follow` (0.0 = instant, 0.99 = very slow).
    smoothing: f32,
    /// Parameters handed to every primitive drawn through this camera.
    pub style: DrawStyle,
}

impl Camera {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        let mut camera = Self {
            view: Matrix::IDENTITY,
            zoom: 1.0,
            focus: Vector::ZERO,
            screen_width,
            screen_height,
            smoothing: 0.0,
            style: DrawStyle::default(),
        };
        camera.rebuild();
        camera
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut camera = Self::new(config.screen_width, config.screen_height);
        camera.style.point_radius = config.point_radius;
        camera.set_zoom(config.camera_zoom);
        camera
    }

    pub fn view(&self) -> Matrix {
        self.view
    }

    /// Replace the view outright.
    pub fn set_view(&mut self, view: Matrix) {
        self.view = view;
    }

    /// `view <- view * m`.
    pub fn apply_view(&mut self, m: Matrix) {
        self.view = self.view * m;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        self.rebuild();
    }

    pub fn focus(&self) -> Vector {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Vector) {
        self.focus = focus;
        self.rebuild();
    }

    pub fn screen_center(&self) -> Vector {
        Vector::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    /// Resize the screen (e.g. on window resize). Keeps zoom and focus.
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;
        self.rebuild();
    }

    /// Set smoothing factor for `follow`.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 0.99);
    }

    /// Move the focus toward `target`. Call once per frame.
    pub fn follow(&mut self, target: Vector, dt: f32) {
        if self.smoothing <= 0.0 {
            self.set_focus(target);
        } else {
            let lerp_factor = 1.0 - self.smoothing.powf(dt * 60.0);
            self.set_focus(self.focus + (target - self.focus) * lerp_factor);
        }
    }

    /// Recompute the view from zoom, focus and screen size.
    pub fn rebuild(&mut self) {
        self.view = Matrix::translate_by(self.screen_center())
            * Matrix::scale(self.zoom)
            * Matrix::translate_by(-self.focus);
        debug!("camera rebuilt: zoom={} focus={}", self.zoom, self.focus);
    }

    /// World point to screen point.
    pub fn project(&self, world_point: Vector) -> Vector {
        self.view * world_point
    }

    /// Screen point to world point. `None` while the view is singular.
    pub fn unproject(&self, screen_point: Vector) -> Option<Vector> {
        match self.view.inverse() {
            Some(inverse) => Some(inverse * screen_point),
            None => {
                warn!("camera view is singular, cannot unproject {}", screen_point);
                None
            }
        }
    }

    /// World-space rectangle covered by the screen.
    pub fn viewport_bounds(&self) -> Option<Bounds> {
        let inverse = self.view.inverse()?;
        let (w, h) = (self.screen_width, self.screen_height);
        let corners = [
            inverse * Vector::new(0.0, 0.0),
            inverse * Vector::new(w, 0.0),
            inverse * Vector::new(w, h),
            inverse * Vector::new(0.0, h),
        ];
        Bounds::from_points(&corners)
    }

    /// Whether a world-space rectangle overlaps the viewport.
    pub fn is_visible(&self, bounds: &Bounds) -> bool {
        self.viewport_bounds()
            .is_some_and(|viewport| viewport.overlaps(bounds))
    }

    /// Draw every sprite in the world through this camera.
    pub fn draw<S: Surface + ?Sized>(&self, world: &mut World, surface: &mut S) {
        for sprite in world.iter_mut() {
            sprite.draw(surface, &self.view, &self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SpriteId;
    use crate::components::primitive::Primitive;
    use crate::components::sprite::Sprite;
    use crate::renderer::draw_list::{DrawCmd, DrawList};

    #[test]
    fn default_view_centers_origin() {
        let cam = Camera::new(640.0, 480.0);
        assert_eq!(cam.project(Vector::ZERO), Vector::new(320.0, 240.0));
    }

    #[test]
    fn focus_lands_on_screen_center() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.set_zoom(12.0);
        cam.set_focus(Vector::new(5.0, -3.0));
        assert_eq!(cam.project(Vector::new(5.0, -3.0)), Vector::new(320.0, 240.0));
        assert_eq!(cam.project(Vector::new(6.0, -3.0)), Vector::new(332.0, 240.0));
    }

    #[test]
    fn unproject_inverts_project() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.set_zoom(4.0);
        cam.set_focus(Vector::new(10.0, 20.0));
        let world = Vector::new(13.5, 17.0);
        let back = cam.unproject(cam.project(world)).unwrap();
        assert!(back.approx_eq(world, 1e-4));
    }

    #[test]
    fn zero_zoom_cannot_unproject() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.set_zoom(0.0);
        assert!(cam.unproject(Vector::new(1.0, 1.0)).is_none());
        assert!(cam.viewport_bounds().is_none());
        assert!(!cam.is_visible(&Bounds::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn apply_view_post_multiplies() {
        let mut cam = Camera::new(0.0, 0.0);
        cam.set_view(Matrix::translate(320.0, 240.0));
        cam.apply_view(Matrix::scale(2.0));
        assert_eq!(cam.project(Vector::new(1.0, 1.0)), Vector::new(322.0, 242.0));

        // A rebuild discards manual adjustments.
        cam.rebuild();
        assert_eq!(cam.view(), Matrix::IDENTITY);
    }

    #[test]
    fn viewport_bounds_in_world_units() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.set_zoom(2.0);
        let b = cam.viewport_bounds().unwrap();
        assert!((b.x_min + 160.0).abs() < 1e-3);
        assert!((b.x_max - 160.0).abs() < 1e-3);
        assert!((b.y_min + 120.0).abs() < 1e-3);
        assert!((b.y_max - 120.0).abs() < 1e-3);
        assert!(cam.is_visible(&Bounds::new(150.0, 170.0, 0.0, 1.0)));
        assert!(!cam.is_visible(&Bounds::new(161.0, 170.0, 0.0, 1.0)));
    }

    #[test]
    fn draw_uses_view_for_every_sprite() {
        let mut world = World::new();
        world
            .spawn(Sprite::new(SpriteId(1), vec![Primitive::point(Vector::ZERO)]))
            .unwrap();
        world
            .spawn(Sprite::new(SpriteId(2), vec![Primitive::point(Vector::new(1.0, 0.0))]))
            .unwrap();

        let mut cam = Camera::new(0.0, 0.0);
        cam.set_view(Matrix::translate(100.0, 100.0));
        let mut list = DrawList::new();
        cam.draw(&mut world, &mut list);

        let centers: Vec<Vector> = list
            .cmds()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(centers, vec![Vector::new(100.0, 100.0), Vector::new(101.0, 100.0)]);
    }

    #[test]
    fn follow_with_smoothing_interpolates() {
        let mut cam = Camera::new(100.0, 100.0);
        cam.set_smoothing(0.9);
        cam.follow(Vector::new(100.0, 100.0), 0.016);
        let f = cam.focus();
        assert!(f.x() > 0.0 && f.x() < 100.0);

        cam.set_smoothing(0.0);
        cam.follow(Vector::new(100.0, 100.0), 0.016);
        assert_eq!(cam.focus(), Vector::new(100.0, 100.0));
    }
}
