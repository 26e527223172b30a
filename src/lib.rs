//! CAD viewport core: projection management and line rendering.
//!
//! The crate covers the numerical heart of a CAD viewport: an orthographic
//! "flat" view and a perspective 3D view over the same scene, pixel-exact
//! screen/world transforms for picking and panning, and a line renderer that
//! draws thin segments as native line primitives and thick ones as quads,
//! with screen-space dash stippling.
//!
//! The surrounding application owns the document model and the window; it
//! hands this crate a viewport size, a stream of segments with resolvable
//! styles, and a [`render::DrawTarget`] to submit geometry to. A wgpu
//! realization of that target lives in [`render::pipeline`].
//!
//! Matrices are right-handed with clip-space depth in [-1, 1]. A projection
//! matrix is recognizably orthographic from its cells alone
//! ([`projection::is_orthographic_matrix`]), but the crate threads an explicit
//! [`projection::ProjectionKind`] tag alongside the matrix instead of relying
//! on that inspection.

pub mod camera;
pub mod error;
pub mod pick;
pub mod projection;
pub mod render;
pub mod style;
pub mod transform;
pub mod viewport;

pub use camera::Camera;
pub use error::ProjectionError;
pub use pick::DEFAULT_PICKBOX_PX;
pub use projection::{ProjectionKind, ProjectionMode, ProjectionState};
pub use render::{DrawBatch, DrawTarget, LineSegment, Primitive, RecordingTarget, Topology};
pub use style::{
    resolve_style, DashOverride, DashPattern, Layer, LineWeight, ObjectStyle, ResolvedStyle, Rgba,
};
pub use viewport::Viewport;
