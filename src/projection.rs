use glam::{Mat4, Vec2, Vec4};

use crate::camera::Camera;
use crate::error::{ProjectionError, Result};

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
pub const PERSPECTIVE_FOVY: f32 = std::f32::consts::FRAC_PI_4;
pub const MIN_ORTHO_SCALE: f32 = 0.1;

/// Tolerance for reading the orthographic sentinel cells back out of a matrix.
pub const SENTINEL_EPSILON: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    pub const ALL: [ProjectionMode; 2] = [ProjectionMode::Orthographic, ProjectionMode::Perspective];

    pub fn label(self) -> &'static str {
        match self {
            ProjectionMode::Orthographic => "Orthographic",
            ProjectionMode::Perspective => "Perspective",
        }
    }
}

impl std::fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Projection tag carried alongside the matrix, so nothing downstream has to
/// recover the mode by inspecting matrix cells. The cells still hold the
/// conventional sentinel values for code that does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    Orthographic { scale: f32, center: Vec2 },
    Perspective { fovy: f32 },
}

/// Right-handed orthographic projection with clip-space depth in [-1, 1].
///
/// The returned matrix keeps `cols[2][3] == 0` and `cols[3][3] == 1`, which is
/// how a matrix is recognized as orthographic (see [`is_orthographic_matrix`]).
pub fn orthographic_matrix(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Result<Mat4> {
    if !(right > left) || !(top > bottom) {
        return Err(ProjectionError::EmptyWindow {
            width: right - left,
            height: top - bottom,
        });
    }
    if !(far > near) {
        return Err(ProjectionError::ClipPlanes { near, far });
    }
    Ok(orthographic_cols(left, right, bottom, top, near, far))
}

/// Right-handed symmetric-frustum perspective projection, clip depth [-1, 1].
///
/// The returned matrix keeps `cols[2][3] == -1` and `cols[3][3] == 0`.
pub fn perspective_matrix(fovy: f32, aspect: f32, near: f32, far: f32) -> Result<Mat4> {
    if !(fovy > 0.0) || !(fovy < std::f32::consts::PI) {
        return Err(ProjectionError::FieldOfView(fovy));
    }
    if !(aspect > 0.0) {
        return Err(ProjectionError::Aspect(aspect));
    }
    if !(near > 0.0) || !(far > near) {
        return Err(ProjectionError::ClipPlanes { near, far });
    }
    Ok(perspective_cols(fovy, aspect, near, far))
}

fn orthographic_cols(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (far - near);
    Mat4::from_cols(
        Vec4::new(2.0 * rw, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * rh, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -2.0 * rd, 0.0),
        Vec4::new(
            -(right + left) * rw,
            -(top + bottom) * rh,
            -(far + near) * rd,
            1.0,
        ),
    )
}

fn perspective_cols(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let focal = 1.0 / (0.5 * fovy).tan();
    let rd = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(focal / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, focal, 0.0, 0.0),
        Vec4::new(0.0, 0.0, (far + near) * rd, -1.0),
        Vec4::new(0.0, 0.0, 2.0 * far * near * rd, 0.0),
    )
}

/// Sentinel inspection kept for compatibility with callers that receive a bare
/// matrix: `|M[2][3]| ~ 0` and `M[3][3] ~ 1` means orthographic.
pub fn is_orthographic_matrix(m: &Mat4) -> bool {
    let c = m.to_cols_array_2d();
    c[2][3].abs() < SENTINEL_EPSILON && (c[3][3] - 1.0).abs() < SENTINEL_EPSILON
}

/// Per-viewport projection state. Owns the mode, the viewport pixel size, the
/// orthographic window (scale + center), and the current projection matrix.
///
/// Orthographic panning moves the window center, never the camera; the view
/// matrix used for orthographic rendering is always identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    mode: ProjectionMode,
    viewport_width: f32,
    viewport_height: f32,
    ortho_scale: f32,
    ortho_center: Vec2,
    projection: Mat4,
    kind: ProjectionKind,
}

impl ProjectionState {
    pub fn new(mode: ProjectionMode) -> Self {
        let mut state = Self {
            mode,
            viewport_width: 0.0,
            viewport_height: 0.0,
            ortho_scale: 10.0,
            ortho_center: Vec2::ZERO,
            projection: Mat4::IDENTITY,
            kind: ProjectionKind::Orthographic {
                scale: 10.0,
                center: Vec2::ZERO,
            },
        };
        state.rebuild();
        state
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn ortho_scale(&self) -> f32 {
        self.ortho_scale
    }

    pub fn ortho_center(&self) -> Vec2 {
        self.ortho_center
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport_height > 0.0 {
            self.viewport_width / self.viewport_height
        } else {
            1.0
        }
    }

    /// View matrix to render with: identity in orthographic mode (the window
    /// does all the positioning), the camera's look-at otherwise.
    pub fn render_view_matrix(&self, camera: &Camera) -> Mat4 {
        match self.mode {
            ProjectionMode::Orthographic => Mat4::IDENTITY,
            ProjectionMode::Perspective => camera.view_matrix(),
        }
    }

    /// Store the viewport pixel size and rebuild the projection. A zero or
    /// negative dimension leaves the state untouched.
    pub fn update_projection(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;
        self.rebuild();
    }

    /// Switch projection mode. Entering orthographic realigns the camera to a
    /// top-down view at its current distance and re-centers the orthographic
    /// window on the camera target.
    pub fn set_mode(&mut self, mode: ProjectionMode, camera: &mut Camera) {
        if mode == ProjectionMode::Orthographic && self.mode != ProjectionMode::Orthographic {
            self.ortho_scale = self.ortho_scale.max(MIN_ORTHO_SCALE);
            self.ortho_center = Vec2::new(camera.target.x, camera.target.y);
            camera.align_top_down();
        }
        self.mode = mode;
        self.rebuild();
    }

    pub fn set_orthographic_scale(&mut self, value: f32) {
        self.ortho_scale = value.max(MIN_ORTHO_SCALE);
        if self.mode == ProjectionMode::Orthographic {
            self.rebuild();
        }
    }

    /// Add `delta` world units to the orthographic window height, clamped to
    /// the minimum scale. Rebuilds only in orthographic mode.
    pub fn zoom_orthographic(&mut self, delta: f32) {
        self.set_orthographic_scale(self.ortho_scale + delta);
    }

    /// Pan the orthographic window by a pixel delta. The window center moves
    /// against the drag so the content follows the cursor; the camera itself
    /// never moves in orthographic mode.
    pub fn pan_ortho_pixels(&mut self, dx_px: f32, dy_px: f32) {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return;
        }
        let world_per_px_x = self.ortho_scale * self.aspect() / self.viewport_width;
        let world_per_px_y = self.ortho_scale / self.viewport_height;

        let dx_world = dx_px * world_per_px_x;
        let dy_world = -dy_px * world_per_px_y;
        self.ortho_center -= Vec2::new(dx_world, dy_world);

        if self.mode == ProjectionMode::Orthographic {
            self.rebuild();
        }
    }

    pub(crate) fn set_ortho_window(&mut self, center: Vec2, scale: f32) {
        self.ortho_center = center;
        self.ortho_scale = scale.max(MIN_ORTHO_SCALE);
        if self.mode == ProjectionMode::Orthographic {
            self.rebuild();
        }
    }

    // State invariants (scale clamp, viewport guard, fixed fovy/near/far) keep
    // every rebuild inside the parameter ranges the public constructors guard.
    fn rebuild(&mut self) {
        match self.mode {
            ProjectionMode::Orthographic => {
                let half_h = 0.5 * self.ortho_scale;
                let half_w = half_h * self.aspect();
                let c = self.ortho_center;
                self.projection = orthographic_cols(
                    c.x - half_w,
                    c.x + half_w,
                    c.y - half_h,
                    c.y + half_h,
                    NEAR_PLANE,
                    FAR_PLANE,
                );
                self.kind = ProjectionKind::Orthographic {
                    scale: self.ortho_scale,
                    center: c,
                };
            }
            ProjectionMode::Perspective => {
                self.projection =
                    perspective_cols(PERSPECTIVE_FOVY, self.aspect(), NEAR_PLANE, FAR_PLANE);
                self.kind = ProjectionKind::Perspective {
                    fovy: PERSPECTIVE_FOVY,
                };
            }
        }
    }
}
