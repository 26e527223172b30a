use glam::{Mat4, Vec3};
use log::warn;

/// Pitch is kept away from the poles so the look-at basis never flips.
const PITCH_MIN: f32 = 0.1;
const PITCH_MAX: f32 = std::f32::consts::PI - 0.1;

const VIEW_EPSILON: f32 = 1.0e-6;

/// Free-look camera for the perspective view. One instance per viewport;
/// orthographic rendering ignores it but keeps it aligned so switching back
/// to perspective lands where the user left off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -10.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { position, target, up }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Recompute the eye on a sphere of the current radius around the target.
    /// Pitch is clamped to (0.1, pi - 0.1) radians.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < VIEW_EPSILON {
            warn!("orbit ignored: camera position coincides with target");
            return;
        }

        let yaw = offset.y.atan2(offset.x) + d_yaw;
        let pitch = ((offset.z / radius).clamp(-1.0, 1.0).acos() + d_pitch)
            .clamp(PITCH_MIN, PITCH_MAX);

        let (sp, cp) = (pitch.sin(), pitch.cos());
        let (sy, cy) = yaw.sin_cos();
        self.position = self.target + radius * Vec3::new(sp * cy, sp * sy, cp);
    }

    /// Move the eye along the view direction by `delta` world units.
    pub fn zoom(&mut self, delta: f32) {
        let dir = self.target - self.position;
        if dir.length() < VIEW_EPSILON {
            warn!("zoom ignored: camera position coincides with target");
            return;
        }
        self.position += dir.normalize() * delta;
    }

    /// Slide both eye and target along the screen axes. This is a translation,
    /// not an orbit: the view direction is unchanged.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let view_dir = self.target - self.position;
        if view_dir.length() < VIEW_EPSILON {
            warn!("pan ignored: camera position coincides with target");
            return;
        }

        let right = self.up.cross(view_dir).normalize();
        let up = view_dir.cross(right).normalize();

        let slide = right * dx + up * dy;
        self.position += slide;
        self.target += slide;
    }

    /// Plan-view alignment used when entering orthographic mode: look straight
    /// down the Z axis at the target from the current distance.
    pub(crate) fn align_top_down(&mut self) {
        let radius = self.distance().max(VIEW_EPSILON);
        self.position = self.target + Vec3::new(0.0, 0.0, radius);
        self.up = Vec3::Y;
    }
}
