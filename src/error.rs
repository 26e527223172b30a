use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Rejected projection parameters. These are construction-time failures:
/// nothing downstream retries them.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("vertical field of view must lie in (0, pi), got {0}")]
    FieldOfView(f32),

    #[error("aspect ratio must be positive, got {0}")]
    Aspect(f32),

    #[error("clip planes must be positive and ordered, got near {near}, far {far}")]
    ClipPlanes { near: f32, far: f32 },

    #[error("orthographic window is empty: {width} x {height}")]
    EmptyWindow { width: f32, height: f32 },
}
