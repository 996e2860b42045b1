//! Error types for viewport configuration and frustum computation

/// Errors produced while configuring a viewport or computing its frustum.
///
/// All failures are detected synchronously at the offending call and are
/// deterministic: retrying with the same input reproduces the same error.
/// A viewport that hits an error keeps the last valid cached matrices, so a
/// bad reconfiguration never blanks a display tile.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// Corner or eye index outside the three valid slots
    #[error("index {0} is out of range (must be 0-2)")]
    InvalidIndex(usize),

    /// View plane basis is unusable, or the eye is on the wrong side of it
    #[error("degenerate view plane geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// Clip distances must satisfy 0 < near < far
    #[error("invalid clip range: near {near} far {far} (requires 0 < near < far)")]
    InvalidClipRange { near: f32, far: f32 },

    /// Field-of-view angles must each stay below 90 degrees in magnitude
    /// and below 180 degrees combined per axis
    #[error("invalid field of view: up {up} down {down} left {left} right {right} degrees")]
    InvalidFov { up: f32, down: f32, left: f32, right: f32 },
}
