//! Line rendering: endpoint projection, thin-line vs thick-quad geometry
//! selection, and draw submission through an abstract target.

use glam::{Mat4, Vec2, Vec3};
use log::debug;

use crate::projection::{ProjectionKind, ProjectionState};
use crate::style::{DashPattern, ResolvedStyle, Rgba};
use crate::transform::W_EPSILON;

pub mod pipeline;
pub mod stipple;
pub mod vertex;

pub use vertex::LineVertex;

/// Widths at or below this draw as a native line primitive; anything wider
/// gets quad geometry.
pub const THIN_WIDTH_MAX: f32 = 2.5;

/// Segments shorter than this in NDC degrade to the thin-line path instead of
/// producing a zero-area quad.
pub const MIN_NDC_LENGTH: f32 = 1.0e-4;

/// A drawable straight segment. The id is the handle hit-testing reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub id: u64,
    pub start: Vec3,
    pub end: Vec3,
}

impl LineSegment {
    pub fn new(id: u64, start: Vec3, end: Vec3) -> Self {
        Self { id, start, end }
    }
}

/// Geometry kinds the renderer knows how to draw. Only segments today; the
/// single dispatch point below is where new kinds get added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Segment(LineSegment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Lines,
    Triangles,
}

/// One draw submission: NDC vertices plus the material state the backend
/// needs (color, native line width, and the screen-space stipple frame).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub topology: Topology,
    pub vertices: Vec<LineVertex>,
    pub color: Rgba,
    pub width_px: f32,
    pub dash: DashPattern,
    /// Screen-pixel endpoints driving the fragment-stage stipple.
    pub start_px: Vec2,
    pub end_px: Vec2,
    pub viewport_px: Vec2,
}

/// Abstract draw capability: upload vertices, draw them as lines or
/// triangles. The wgpu realization lives in [`pipeline`]; tests use
/// [`RecordingTarget`].
pub trait DrawTarget {
    fn submit(&mut self, batch: DrawBatch);
}

/// Draw target that records submissions instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub batches: Vec<DrawBatch>,
}

impl DrawTarget for RecordingTarget {
    fn submit(&mut self, batch: DrawBatch) {
        self.batches.push(batch);
    }
}

pub fn render_primitive(
    primitive: &Primitive,
    style: &ResolvedStyle,
    state: &ProjectionState,
    view: &Mat4,
    target: &mut dyn DrawTarget,
) {
    match primitive {
        Primitive::Segment(segment) => render_segment(segment, style, state, view, target),
    }
}

/// Project one segment and submit it. Malformed input (non-finite endpoint,
/// degenerate homogeneous w, non-finite NDC) skips the segment with a
/// diagnostic; one bad object never aborts the frame.
pub fn render_segment(
    segment: &LineSegment,
    style: &ResolvedStyle,
    state: &ProjectionState,
    view: &Mat4,
    target: &mut dyn DrawTarget,
) {
    if !segment.start.is_finite() || !segment.end.is_finite() {
        debug!("segment {}: skipped, non-finite endpoint", segment.id);
        return;
    }

    let (ndc_a, ndc_b) = match project_endpoints(segment, state, view) {
        Some(pair) => pair,
        None => {
            debug!("segment {}: skipped, degenerate projection", segment.id);
            return;
        }
    };

    let (width, height) = state.viewport_size();
    let viewport_px = Vec2::new(width, height);
    let start_px = ndc_to_pixels(ndc_a, width, height);
    let end_px = ndc_to_pixels(ndc_b, width, height);

    let span = Vec2::new(ndc_b.x - ndc_a.x, ndc_b.y - ndc_a.y);
    let span_len = span.length();

    let thin = style.width_px <= THIN_WIDTH_MAX || span_len < MIN_NDC_LENGTH;
    let (topology, vertices) = if thin {
        (
            Topology::Lines,
            vec![
                LineVertex {
                    position: ndc_a.to_array(),
                },
                LineVertex {
                    position: ndc_b.to_array(),
                },
            ],
        )
    } else {
        (Topology::Triangles, quad_vertices(ndc_a, ndc_b, span, span_len, style.width_px, width))
    };

    target.submit(DrawBatch {
        topology,
        vertices,
        color: style.color,
        width_px: style.width_px,
        dash: style.dash,
        start_px,
        end_px,
        viewport_px,
    });
}

/// Endpoints to NDC, dispatched on the projection tag. Orthographic clip
/// space has `w == 1` exactly (identity view, affine matrix), so no divide;
/// perspective divides by `w` and rejects near-zero values.
fn project_endpoints(
    segment: &LineSegment,
    state: &ProjectionState,
    view: &Mat4,
) -> Option<(Vec3, Vec3)> {
    match state.kind() {
        ProjectionKind::Orthographic { .. } => {
            let a = (state.matrix() * segment.start.extend(1.0)).truncate();
            let b = (state.matrix() * segment.end.extend(1.0)).truncate();
            (a.is_finite() && b.is_finite()).then_some((a, b))
        }
        ProjectionKind::Perspective { .. } => {
            let vp = state.matrix() * *view;
            let a = vp * segment.start.extend(1.0);
            let b = vp * segment.end.extend(1.0);
            if a.w.abs() < W_EPSILON || b.w.abs() < W_EPSILON {
                return None;
            }
            let a = a.truncate() / a.w;
            let b = b.truncate() / b.w;
            (a.is_finite() && b.is_finite()).then_some((a, b))
        }
    }
}

fn ndc_to_pixels(ndc: Vec3, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * width,
        (1.0 - (ndc.y * 0.5 + 0.5)) * height,
    )
}

/// Expand a segment into a screen-aligned quad: rotate the NDC direction 90
/// degrees, offset both endpoints by the half-width, emit two triangles
/// (v0 v1 v2, v2 v1 v3).
fn quad_vertices(
    ndc_a: Vec3,
    ndc_b: Vec3,
    span: Vec2,
    span_len: f32,
    width_px: f32,
    viewport_width_px: f32,
) -> Vec<LineVertex> {
    let perp = Vec2::new(-span.y, span.x) / span_len;
    let half_width = (width_px * 0.5) / (viewport_width_px * 0.5);
    let offset = perp * half_width;

    let v0 = [ndc_a.x + offset.x, ndc_a.y + offset.y, ndc_a.z];
    let v1 = [ndc_a.x - offset.x, ndc_a.y - offset.y, ndc_a.z];
    let v2 = [ndc_b.x + offset.x, ndc_b.y + offset.y, ndc_b.z];
    let v3 = [ndc_b.x - offset.x, ndc_b.y - offset.y, ndc_b.z];

    [v0, v1, v2, v2, v1, v3]
        .into_iter()
        .map(|position| LineVertex { position })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionMode;
    use approx::assert_abs_diff_eq;

    fn ortho_state() -> ProjectionState {
        let mut state = ProjectionState::new(ProjectionMode::Orthographic);
        state.update_projection(800.0, 600.0);
        state
    }

    fn plain_style(width_px: f32) -> ResolvedStyle {
        ResolvedStyle {
            color: Rgba::WHITE,
            width_px,
            dash: DashPattern::Continuous,
        }
    }

    #[test]
    fn thin_width_draws_line_primitive() {
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        let segment = LineSegment::new(1, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        render_segment(&segment, &plain_style(1.0), &state, &Mat4::IDENTITY, &mut target);

        assert_eq!(target.batches.len(), 1);
        let batch = &target.batches[0];
        assert_eq!(batch.topology, Topology::Lines);
        assert_eq!(batch.vertices.len(), 2);
    }

    #[test]
    fn thick_width_draws_quad() {
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        let segment = LineSegment::new(1, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        render_segment(&segment, &plain_style(5.0), &state, &Mat4::IDENTITY, &mut target);

        let batch = &target.batches[0];
        assert_eq!(batch.topology, Topology::Triangles);
        assert_eq!(batch.vertices.len(), 6);

        // Horizontal segment: the quad offsets are vertical, half-width in
        // NDC = (5 * 0.5) / (800 * 0.5).
        let expected = 2.5 / 400.0;
        assert_abs_diff_eq!(
            batch.vertices[0].position[1] - batch.vertices[1].position[1],
            2.0 * expected,
            epsilon = 1e-6
        );
    }

    #[test]
    fn zero_length_thick_segment_degrades_to_line() {
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        let p = Vec3::new(1.0, 1.0, 0.0);
        let segment = LineSegment::new(7, p, p);
        render_segment(&segment, &plain_style(6.0), &state, &Mat4::IDENTITY, &mut target);

        assert_eq!(target.batches.len(), 1);
        assert_eq!(target.batches[0].topology, Topology::Lines);
    }

    #[test]
    fn non_finite_endpoint_skips_draw() {
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let segment =
                LineSegment::new(3, Vec3::new(bad, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
            render_segment(&segment, &plain_style(1.0), &state, &Mat4::IDENTITY, &mut target);
        }
        assert!(target.batches.is_empty());
    }

    #[test]
    fn scenario_segment_clips_near_ndc_edges() {
        // scale 10, 800x600 (aspect 1.333), center (0,0): world x = +-6 lands
        // at NDC x = +-6/6.665 ~ 0.9002.
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        let segment = LineSegment::new(1, Vec3::new(-6.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0));
        render_segment(&segment, &plain_style(1.0), &state, &Mat4::IDENTITY, &mut target);

        let batch = &target.batches[0];
        assert_abs_diff_eq!(batch.vertices[0].position[0], -0.9002, epsilon = 1e-3);
        assert_abs_diff_eq!(batch.vertices[1].position[0], 0.9002, epsilon = 1e-3);
    }

    #[test]
    fn perspective_segment_behind_eye_is_skipped() {
        let mut state = ProjectionState::new(ProjectionMode::Perspective);
        state.update_projection(800.0, 600.0);
        let camera = crate::camera::Camera::default();
        let view = camera.view_matrix();

        // Both endpoints sit on the eye plane, where w collapses.
        let mut target = RecordingTarget::default();
        let segment = LineSegment::new(9, camera.position, camera.position);
        render_segment(&segment, &plain_style(1.0), &state, &view, &mut target);
        assert!(target.batches.is_empty());
    }

    #[test]
    fn stipple_frame_is_screen_space() {
        let state = ortho_state();
        let mut target = RecordingTarget::default();
        let style = ResolvedStyle {
            color: Rgba::WHITE,
            width_px: 1.0,
            dash: DashPattern::Dashed,
        };
        // World x = half_w = scale * aspect / 2 = 20/3 is exactly the right
        // viewport edge at scale 10 / 800x600.
        let segment = LineSegment::new(1, Vec3::ZERO, Vec3::new(20.0 / 3.0, 0.0, 0.0));
        render_segment(&segment, &style, &state, &Mat4::IDENTITY, &mut target);

        let batch = &target.batches[0];
        assert_eq!(batch.dash, DashPattern::Dashed);
        assert_abs_diff_eq!(batch.start_px.x, 400.0, epsilon = 1e-2);
        assert_abs_diff_eq!(batch.start_px.y, 300.0, epsilon = 1e-2);
        assert_abs_diff_eq!(batch.end_px.x, 800.0, epsilon = 1e-2);
        assert_eq!(batch.viewport_px, Vec2::new(800.0, 600.0));
    }
}
