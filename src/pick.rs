//! Pickbox hit-testing against line segments.

use glam::{Mat4, Vec3};

use crate::projection::ProjectionState;
use crate::render::LineSegment;
use crate::transform;

pub const DEFAULT_PICKBOX_PX: f32 = 5.0;

/// Find the segment nearest the cursor within the pickbox tolerance.
///
/// The pickbox half-size is projected into world space by unprojecting the
/// center pixel and four offset samples; the largest center-to-sample spread
/// becomes the world tolerance, so it adapts to zoom (and to perspective
/// depth at the cursor). Among candidates within tolerance the nearest wins;
/// exact ties go to the lowest id, keeping the result independent of
/// enumeration order.
pub fn hit_test<'a, I>(
    state: &ProjectionState,
    view: &Mat4,
    segments: I,
    x_px: f32,
    y_px: f32,
    pickbox_px: f32,
) -> Option<u64>
where
    I: IntoIterator<Item = &'a LineSegment>,
{
    let center = transform::screen_to_world(state, view, x_px, y_px)?;

    let mut tolerance = 0.0f32;
    for (dx, dy) in [
        (pickbox_px, 0.0),
        (-pickbox_px, 0.0),
        (0.0, pickbox_px),
        (0.0, -pickbox_px),
    ] {
        if let Some(sample) = transform::screen_to_world(state, view, x_px + dx, y_px + dy) {
            tolerance = tolerance.max(sample.distance(center));
        }
    }
    if tolerance <= 0.0 {
        return None;
    }

    let mut best: Option<(u64, f32)> = None;
    for segment in segments {
        let distance = point_segment_distance(center, segment.start, segment.end);
        if distance > tolerance {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_id, best_distance)) => {
                distance < best_distance || (distance == best_distance && segment.id < best_id)
            }
        };
        if better {
            best = Some((segment.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Distance from a point to the closest point on segment `ab`.
pub fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
