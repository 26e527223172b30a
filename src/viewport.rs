//! Per-viewport facade tying camera, projection, transforms, rendering and
//! picking together. Each viewport owns its own [`Camera`] and
//! [`ProjectionState`]; nothing here is shared between viewports.

use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::pick;
use crate::projection::{ProjectionMode, ProjectionState, MIN_ORTHO_SCALE, PERSPECTIVE_FOVY};
use crate::render::{self, DrawTarget, LineSegment, Primitive};
use crate::style::ResolvedStyle;
use crate::transform;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    camera: Camera,
    projection: ProjectionState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ProjectionMode::Orthographic)
    }
}

impl Viewport {
    pub fn new(mode: ProjectionMode) -> Self {
        Self {
            camera: Camera::default(),
            projection: ProjectionState::new(mode),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.projection.update_projection(width, height);
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection.set_mode(mode, &mut self.camera);
    }

    pub fn set_orthographic_scale(&mut self, value: f32) {
        self.projection.set_orthographic_scale(value);
    }

    pub fn zoom_orthographic(&mut self, delta: f32) {
        self.projection.zoom_orthographic(delta);
    }

    pub fn pan_orthographic(&mut self, dx_px: f32, dy_px: f32) {
        self.projection.pan_ortho_pixels(dx_px, dy_px);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// View matrix used for rendering: identity in orthographic mode.
    pub fn view_matrix(&self) -> Mat4 {
        self.projection.render_view_matrix(&self.camera)
    }

    /// Mode-dispatched unprojection of a pixel onto the drawing plane.
    pub fn screen_to_world(&self, x_px: f32, y_px: f32) -> Option<Vec3> {
        transform::screen_to_world(&self.projection, &self.view_matrix(), x_px, y_px)
    }

    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        transform::world_to_screen(&self.projection, &self.view_matrix(), point)
    }

    /// Draw one segment with an already-resolved style.
    pub fn render_line(
        &self,
        segment: &LineSegment,
        style: &ResolvedStyle,
        target: &mut dyn DrawTarget,
    ) {
        render::render_primitive(
            &Primitive::Segment(*segment),
            style,
            &self.projection,
            &self.view_matrix(),
            target,
        );
    }

    /// Find the segment nearest the cursor within the pickbox, if any.
    pub fn hit_test<'a, I>(&self, segments: I, x_px: f32, y_px: f32, pickbox_px: f32) -> Option<u64>
    where
        I: IntoIterator<Item = &'a LineSegment>,
    {
        pick::hit_test(
            &self.projection,
            &self.view_matrix(),
            segments,
            x_px,
            y_px,
            pickbox_px,
        )
    }

    /// Device pixels per world unit at the center of interest. Used for snap
    /// radii and scale bars.
    pub fn pixels_per_world_unit(&self) -> f32 {
        let (_, height) = self.projection.viewport_size();
        match self.projection.mode() {
            ProjectionMode::Orthographic => height / self.projection.ortho_scale(),
            ProjectionMode::Perspective => {
                let distance = self.camera.distance().max(1.0e-6);
                let world_height = 2.0 * (0.5 * PERSPECTIVE_FOVY).tan() * distance;
                height / world_height
            }
        }
    }

    /// Frame a set of points in the orthographic window with a 10% margin.
    /// Points with non-finite coordinates are ignored; does nothing when no
    /// usable point remains or when the viewport is in perspective mode.
    pub fn zoom_to_fit(&mut self, points: &[Vec3]) {
        if self.projection.mode() != ProjectionMode::Orthographic {
            return;
        }

        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut any = false;
        for p in points {
            if p.x.is_finite() && p.y.is_finite() {
                min = min.min(Vec2::new(p.x, p.y));
                max = max.max(Vec2::new(p.x, p.y));
                any = true;
            }
        }
        if !any {
            return;
        }

        let center = 0.5 * (min + max);
        let extent = max - min;
        let aspect = self.projection.aspect();
        let need = (extent.y).max(extent.x / aspect).max(MIN_ORTHO_SCALE);
        self.projection.set_ortho_window(center, need * 1.1);
    }
}
