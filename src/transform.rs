//! Screen/world coordinate transforms.
//!
//! Orthographic mode gets an exact closed form recovered from the projection
//! matrix cells alone; perspective mode casts a ray through the cursor and
//! intersects it with the `z = 0` world plane.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::projection::{ProjectionMode, ProjectionState};

/// Homogeneous `w` below this magnitude is treated as degenerate.
pub const W_EPSILON: f32 = 1.0e-4;
/// Ray direction z-component below this magnitude counts as parallel to z = 0.
pub const RAY_EPSILON: f32 = 1.0e-4;

pub fn pixel_to_ndc(x_px: f32, y_px: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(2.0 * x_px / width - 1.0, 1.0 - 2.0 * y_px / height)
}

/// Exact orthographic unprojection of a pixel onto the plane `z = world_z`.
///
/// The window half-extents and center are read back from the projection
/// matrix (`half = 1 / M[i][i]`, `center = -M[3][i] * half`), so the result
/// stays consistent with whatever matrix is actually bound for rendering.
///
/// # Panics
///
/// Panics when the state is not in orthographic mode; that is a caller bug,
/// not bad data.
pub fn screen_to_world_ortho(state: &ProjectionState, x_px: f32, y_px: f32, world_z: f32) -> Vec3 {
    assert!(
        state.mode() == ProjectionMode::Orthographic,
        "screen_to_world_ortho called while in {} mode",
        state.mode()
    );

    let (width, height) = state.viewport_size();
    let ndc = pixel_to_ndc(x_px, y_px, width, height);

    let c = state.matrix().to_cols_array_2d();
    let half_w = 1.0 / c[0][0];
    let half_h = 1.0 / c[1][1];
    let center_x = -c[3][0] * half_w;
    let center_y = -c[3][1] * half_h;

    Vec3::new(
        center_x + ndc.x * half_w,
        center_y + ndc.y * half_h,
        world_z,
    )
}

/// Cast a ray through the pixel and intersect it with the `z = 0` world plane.
/// Returns `None` when the ray is parallel to the plane or the intersection
/// lies behind the ray origin.
pub fn screen_to_world_perspective(
    state: &ProjectionState,
    view: &Mat4,
    x_px: f32,
    y_px: f32,
) -> Option<Vec3> {
    let (width, height) = state.viewport_size();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let ndc = pixel_to_ndc(x_px, y_px, width, height);

    let inverse_vp = (state.matrix() * *view).inverse();
    let near = unproject(&inverse_vp, ndc, -1.0)?;
    let far = unproject(&inverse_vp, ndc, 1.0)?;

    let dir = far - near;
    if dir.z.abs() < RAY_EPSILON {
        return None;
    }
    let t = -near.z / dir.z;
    if t < 0.0 {
        return None;
    }
    Some(near + dir * t)
}

fn unproject(inverse_vp: &Mat4, ndc: Vec2, ndc_z: f32) -> Option<Vec3> {
    let p = *inverse_vp * Vec4::new(ndc.x, ndc.y, ndc_z, 1.0);
    if p.w.abs() < W_EPSILON {
        return None;
    }
    Some(p.truncate() / p.w)
}

/// Transform a world point to viewport pixels. Returns `None` for a
/// near-zero homogeneous `w`.
pub fn world_to_screen(state: &ProjectionState, view: &Mat4, point: Vec3) -> Option<Vec2> {
    let clip = state.matrix() * *view * point.extend(1.0);
    if clip.w.abs() < W_EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;

    let (width, height) = state.viewport_size();
    Some(Vec2::new(
        (ndc.x * 0.5 + 0.5) * width,
        (1.0 - (ndc.y * 0.5 + 0.5)) * height,
    ))
}

/// Mode-dispatched unprojection: exact closed form onto `z = 0` in
/// orthographic mode, ray cast in perspective mode.
pub fn screen_to_world(state: &ProjectionState, view: &Mat4, x_px: f32, y_px: f32) -> Option<Vec3> {
    match state.mode() {
        ProjectionMode::Orthographic => Some(screen_to_world_ortho(state, x_px, y_px, 0.0)),
        ProjectionMode::Perspective => screen_to_world_perspective(state, view, x_px, y_px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_abs_diff_eq;

    fn ortho_state() -> ProjectionState {
        let mut state = ProjectionState::new(ProjectionMode::Orthographic);
        state.update_projection(800.0, 600.0);
        state
    }

    #[test]
    fn ortho_round_trip_is_pixel_exact() {
        let state = ortho_state();
        let view = Mat4::IDENTITY;
        for &(x, y) in &[(0.0, 0.0), (400.0, 300.0), (799.0, 1.0), (13.25, 571.5)] {
            let world = screen_to_world_ortho(&state, x, y, 0.0);
            let back = world_to_screen(&state, &view, world).unwrap();
            assert_abs_diff_eq!(back.x, x, epsilon = 1e-3);
            assert_abs_diff_eq!(back.y, y, epsilon = 1e-3);
        }
    }

    #[test]
    fn ortho_closed_form_agrees_with_tracked_center() {
        let mut state = ortho_state();
        state.pan_ortho_pixels(120.0, -45.0);
        // Center pixel must map to the window center the state tracks.
        let world = screen_to_world_ortho(&state, 400.0, 300.0, 0.0);
        assert_abs_diff_eq!(world.x, state.ortho_center().x, epsilon = 1e-4);
        assert_abs_diff_eq!(world.y, state.ortho_center().y, epsilon = 1e-4);
    }

    #[test]
    #[should_panic(expected = "screen_to_world_ortho")]
    fn ortho_transform_panics_in_perspective_mode() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        let _ = screen_to_world_ortho(&state, 0.0, 0.0, 0.0);
    }

    #[test]
    fn perspective_center_pixel_hits_plane_under_target() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        let camera = Camera::default();
        let view = camera.view_matrix();

        let hit = screen_to_world_perspective(&state, &view, 400.0, 300.0).unwrap();
        // Camera looks at the origin, which lies on z = 0.
        assert_abs_diff_eq!(hit.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn perspective_ray_parallel_to_plane_misses() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        // Camera level with the plane, looking along +y: the center ray never
        // crosses z = 0 at a single forward point.
        let camera = Camera::new(
            glam::Vec3::new(0.0, -10.0, 0.0),
            glam::Vec3::new(0.0, 0.0, 0.0),
            glam::Vec3::Z,
        );
        let view = camera.view_matrix();
        assert!(screen_to_world_perspective(&state, &view, 400.0, 300.0).is_none());
    }

    #[test]
    fn perspective_round_trip_through_world_to_screen() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        let camera = Camera::default();
        let view = camera.view_matrix();

        let hit = screen_to_world_perspective(&state, &view, 250.0, 410.0).unwrap();
        let back = world_to_screen(&state, &view, hit).unwrap();
        assert_abs_diff_eq!(back.x, 250.0, epsilon = 1e-2);
        assert_abs_diff_eq!(back.y, 410.0, epsilon = 1e-2);
    }

    #[test]
    fn world_to_screen_rejects_point_at_eye_plane() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        let camera = Camera::default();
        let view = camera.view_matrix();
        // The eye itself has w ~ 0 after projection.
        assert!(world_to_screen(&state, &view, camera.position).is_none());
    }
}
