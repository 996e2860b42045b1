//! Domecast Core - Clustered-display viewport and frustum math
//!
//! This crate configures a single rendering viewport inside a clustered,
//! multi-display projection system: a tile's normalized placement, its
//! view-plane geometry in world space, and the asymmetric (off-axis)
//! projection and view matrices derived from that geometry for mono and
//! stereo eye modes, plus the symmetric frustum variant used for
//! fisheye/dome rigs.
//!
//! # Architecture
//!
//! - [`ViewPlane`] - three world-space corners defining a planar viewport
//! - [`off_axis`] / [`fisheye`] - frustum construction from plane and eye
//! - [`Viewport`] - aggregate with per-eye matrix caching and asset slots
//! - [`ViewportConfig`] - serde surface for parsed configuration values
//!
//! Rendering, texture loading and mesh warping stay outside the crate; the
//! [`assets`] module defines the narrow interfaces they are reached
//! through.

pub mod assets;
pub mod config;
pub mod error;
pub mod frustum;
pub mod plane;
pub mod viewport;

pub use assets::{CorrectionMesh, CorrectionMeshLoader, MeshPass, TextureHandle, TextureLoader};
pub use config::{GeometryConfig, ViewportConfig};
pub use error::ViewportError;
pub use frustum::{Eye, Frustum, FrustumMatrices, fisheye, off_axis};
pub use plane::{DEFAULT_PLANE_DISTANCE, PlaneCorner, ViewPlane};
pub use viewport::{FrustumStatus, NormalizedRect, Viewport};
