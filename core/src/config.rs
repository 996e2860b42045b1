//! Viewport configuration values
//!
//! Numeric viewport settings as supplied by a cluster configuration file.
//! File discovery and parsing stay with the caller; this module only maps
//! already-parsed values onto viewport state, so every geometric validation
//! lives in the viewport setters.

use std::path::PathBuf;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ViewportError;
use crate::frustum::Eye;
use crate::plane::{DEFAULT_PLANE_DISTANCE, PlaneCorner};
use crate::viewport::{NormalizedRect, Viewport};

/// Per-viewport settings from a cluster configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Viewport name (default: none)
    #[serde(default)]
    pub name: Option<String>,
    /// Normalized placement within the window (default: full window)
    #[serde(default)]
    pub rect: NormalizedRect,
    /// Eye mode the viewport renders (default: mono)
    #[serde(default)]
    pub eye: Eye,
    /// Whether the viewport participates in rendering (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the view plane follows live tracking updates (default: false)
    #[serde(default)]
    pub tracked: bool,
    /// Overlay texture path (default: none)
    #[serde(default)]
    pub overlay_texture: Option<PathBuf>,
    /// Blend mask texture path (default: none)
    #[serde(default)]
    pub mask_texture: Option<PathBuf>,
    /// Correction mesh path (default: none)
    #[serde(default)]
    pub correction_mesh: Option<PathBuf>,
    /// View plane geometry (default: none; the viewport keeps its current
    /// plane)
    #[serde(default)]
    pub geometry: Option<GeometryConfig>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            name: None,
            rect: NormalizedRect::default(),
            eye: Eye::Mono,
            enabled: true,
            tracked: false,
            overlay_texture: None,
            mask_texture: None,
            correction_mesh: None,
            geometry: None,
        }
    }
}

/// How the view plane is specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryConfig {
    /// Explicit world-space corners.
    Corners {
        lower_left: [f32; 3],
        upper_left: [f32; 3],
        upper_right: [f32; 3],
    },
    /// Field-of-view angles in degrees plus an orientation.
    Fov {
        up: f32,
        down: f32,
        left: f32,
        right: f32,
        /// Orientation quaternion as `[x, y, z, w]` (default: identity)
        #[serde(default = "default_orientation")]
        orientation: [f32; 4],
        /// Distance from the eye to the plane (default: 10.0)
        #[serde(default = "default_distance")]
        distance: f32,
    },
}

impl ViewportConfig {
    /// Applies these settings to `viewport`.
    ///
    /// Geometry goes through the validating viewport setters; on error the
    /// viewport keeps whatever was applied before the failing value.
    pub fn apply(&self, viewport: &mut Viewport) -> Result<(), ViewportError> {
        if let Some(name) = &self.name {
            viewport.set_name(name.clone());
        }
        viewport.set_position(self.rect.x, self.rect.y);
        viewport.set_size(self.rect.width, self.rect.height);
        viewport.set_eye(self.eye);
        viewport.set_enabled(self.enabled);
        viewport.set_tracked(self.tracked);
        if let Some(path) = &self.overlay_texture {
            viewport.set_overlay_texture_path(path.clone());
        }
        if let Some(path) = &self.mask_texture {
            viewport.set_mask_texture_path(path.clone());
        }
        if let Some(path) = &self.correction_mesh {
            viewport.set_correction_mesh_path(path.clone());
        }
        match &self.geometry {
            Some(GeometryConfig::Corners {
                lower_left,
                upper_left,
                upper_right,
            }) => {
                viewport.set_view_plane_corner(PlaneCorner::LowerLeft, Vec3::from_array(*lower_left));
                viewport.set_view_plane_corner(PlaneCorner::UpperLeft, Vec3::from_array(*upper_left));
                viewport
                    .set_view_plane_corner(PlaneCorner::UpperRight, Vec3::from_array(*upper_right));
            }
            Some(GeometryConfig::Fov {
                up,
                down,
                left,
                right,
                orientation,
                distance,
            }) => {
                viewport.set_view_plane_from_fov(
                    *up,
                    *down,
                    *left,
                    *right,
                    Quat::from_array(*orientation),
                    *distance,
                )?;
            }
            None => {}
        }
        Ok(())
    }

    /// Builds a fresh viewport from these settings.
    pub fn build(&self) -> Result<Viewport, ViewportError> {
        let mut viewport = Viewport::new();
        self.apply(&mut viewport)?;
        Ok(viewport)
    }
}

fn default_true() -> bool {
    true
}

fn default_orientation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_distance() -> f32 {
    DEFAULT_PLANE_DISTANCE
}
