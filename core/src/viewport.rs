//! Viewport state and matrix caching
//!
//! A viewport owns one tile of a clustered display: its normalized
//! placement, the world-space view plane, and the cached per-eye view and
//! projection matrices derived from that plane. Matrices are recomputed
//! only on explicit request from the owning render loop, never per frame.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::assets::{CorrectionMesh, CorrectionMeshLoader, MeshPass, TextureHandle, TextureLoader};
use crate::error::ViewportError;
use crate::frustum::{self, Eye, Frustum, FrustumMatrices};
use crate::plane::{PlaneCorner, ViewPlane};

/// Normalized screen-space placement of a viewport.
///
/// Components are fractions of the parent window, each normally in [0, 1].
/// Position plus size may exceed the unit square; tiles are allowed to
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Cache state of one eye's matrix set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrustumStatus {
    /// No geometry has been supplied yet
    #[default]
    Unconfigured,
    /// Geometry is present but nothing has been computed
    Configured,
    /// Cached matrices match the current geometry
    Valid,
    /// Geometry changed after the last computation; the cache holds the
    /// previous valid set
    Stale,
}

/// One rendering viewport of a clustered multi-display setup.
pub struct Viewport {
    name: String,
    rect: NormalizedRect,
    eye: Eye,
    plane: ViewPlane,
    matrices: [FrustumMatrices; Eye::COUNT],
    status: [FrustumStatus; Eye::COUNT],
    enabled: bool,
    tracked: bool,
    overlay_path: Option<PathBuf>,
    mask_path: Option<PathBuf>,
    mesh_path: Option<PathBuf>,
    overlay_texture: Option<TextureHandle>,
    mask_texture: Option<TextureHandle>,
    correction_mesh: Option<Arc<dyn CorrectionMesh>>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Creates a viewport covering the whole window.
    pub fn new() -> Self {
        Self::with_rect(NormalizedRect::default())
    }

    /// Creates a viewport with an explicit normalized placement.
    pub fn with_rect(rect: NormalizedRect) -> Self {
        Self {
            name: String::new(),
            rect,
            eye: Eye::Mono,
            plane: ViewPlane::default(),
            matrices: [FrustumMatrices::default(); Eye::COUNT],
            status: [FrustumStatus::Unconfigured; Eye::COUNT],
            enabled: true,
            tracked: false,
            overlay_path: None,
            mask_path: None,
            mesh_path: None,
            overlay_texture: None,
            mask_texture: None,
            correction_mesh: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the normalized origin within the parent window.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    /// Sets the normalized extent within the parent window.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.rect.width = width;
        self.rect.height = height;
    }

    pub fn rect(&self) -> NormalizedRect {
        self.rect
    }

    /// Selects which eye's matrix set is active for rendering.
    pub fn set_eye(&mut self, eye: Eye) {
        self.eye = eye;
    }

    pub fn eye(&self) -> Eye {
        self.eye
    }

    /// Whether the viewport participates in rendering.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the view plane follows live tracking updates.
    pub fn set_tracked(&mut self, tracked: bool) {
        self.tracked = tracked;
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    pub fn view_plane(&self) -> &ViewPlane {
        &self.plane
    }

    pub fn view_plane_corner(&self, corner: PlaneCorner) -> Vec3 {
        self.plane.corner(corner)
    }

    /// Corner lookup with a raw index from a configuration source.
    pub fn view_plane_corner_by_index(&self, index: usize) -> Result<Vec3, ViewportError> {
        Ok(self.plane.corner(PlaneCorner::from_index(index)?))
    }

    /// Replaces the whole view plane.
    pub fn set_view_plane(&mut self, plane: ViewPlane) {
        self.plane = plane;
        self.mark_geometry_changed();
    }

    /// Stores one view-plane corner.
    pub fn set_view_plane_corner(&mut self, corner: PlaneCorner, position: Vec3) {
        self.plane.set_corner(corner, position);
        self.mark_geometry_changed();
    }

    /// Corner update with a raw index from a configuration source. Fails
    /// without touching the stored corners when the index is out of range.
    pub fn set_view_plane_corner_by_index(
        &mut self,
        index: usize,
        position: Vec3,
    ) -> Result<(), ViewportError> {
        let corner = PlaneCorner::from_index(index)?;
        self.set_view_plane_corner(corner, position);
        Ok(())
    }

    /// Stores one view-plane corner from a homogeneous position (divided by
    /// `w` when `w` is non-zero).
    pub fn set_view_plane_corner_homogeneous(&mut self, corner: PlaneCorner, position: Vec4) {
        self.plane.set_corner_homogeneous(corner, position);
        self.mark_geometry_changed();
    }

    /// Derives the view plane from field-of-view angles, see
    /// [`ViewPlane::set_from_fov`]. On error the plane is unchanged.
    pub fn set_view_plane_from_fov(
        &mut self,
        up: f32,
        down: f32,
        left: f32,
        right: f32,
        orientation: Quat,
        distance: f32,
    ) -> Result<(), ViewportError> {
        self.plane
            .set_from_fov(up, down, left, right, orientation, distance)?;
        self.mark_geometry_changed();
        Ok(())
    }

    /// Computes and caches the off-axis frustum for `eye`.
    ///
    /// On error the cached matrices and status for `eye` are left
    /// untouched, so the last valid set keeps rendering.
    pub fn compute_frustum(
        &mut self,
        eye: Eye,
        eye_position: Vec3,
        near: f32,
        far: f32,
    ) -> Result<(), ViewportError> {
        let matrices = frustum::off_axis(&self.plane, eye_position, near, far)?;
        self.store(eye, matrices);
        Ok(())
    }

    /// Computes and caches the fisheye/dome frustum for `eye`, with the
    /// notional eye shifted by `render_offset` for this node's partition of
    /// the field.
    pub fn compute_fisheye_frustum(
        &mut self,
        eye: Eye,
        eye_position: Vec3,
        render_offset: Vec3,
        near: f32,
        far: f32,
    ) -> Result<(), ViewportError> {
        let matrices = frustum::fisheye(&self.plane, eye_position, render_offset, near, far)?;
        self.store(eye, matrices);
        Ok(())
    }

    pub fn view_matrix(&self, eye: Eye) -> Mat4 {
        self.matrices[eye.index()].view
    }

    pub fn projection_matrix(&self, eye: Eye) -> Mat4 {
        self.matrices[eye.index()].projection
    }

    pub fn view_projection_matrix(&self, eye: Eye) -> Mat4 {
        self.matrices[eye.index()].view_projection
    }

    pub fn frustum(&self, eye: Eye) -> Frustum {
        self.matrices[eye.index()].frustum
    }

    /// Frustum extents of the active eye.
    pub fn active_frustum(&self) -> Frustum {
        self.frustum(self.eye)
    }

    /// Cache state for `eye`; matrices are trustworthy only when this is
    /// [`FrustumStatus::Valid`].
    pub fn frustum_status(&self, eye: Eye) -> FrustumStatus {
        self.status[eye.index()]
    }

    /// Resets to a full-tile placeholder used when a node has no configured
    /// view of its own.
    pub fn set_as_dummy(&mut self) {
        self.name = "dummy".into();
        self.rect = NormalizedRect::default();
        self.plane = ViewPlane::default();
        self.enabled = true;
        self.tracked = false;
        self.overlay_path = None;
        self.mask_path = None;
        self.mesh_path = None;
        self.overlay_texture = None;
        self.mask_texture = None;
        self.correction_mesh = None;
        self.mark_geometry_changed();
    }

    pub fn set_overlay_texture_path(&mut self, path: impl Into<PathBuf>) {
        self.overlay_path = Some(path.into());
    }

    pub fn set_mask_texture_path(&mut self, path: impl Into<PathBuf>) {
        self.mask_path = Some(path.into());
    }

    pub fn set_correction_mesh_path(&mut self, path: impl Into<PathBuf>) {
        self.mesh_path = Some(path.into());
    }

    /// Resolves the stored asset paths through the collaborators.
    ///
    /// Failed loads are logged and leave the slot empty; the viewport keeps
    /// rendering without the asset.
    pub fn load_assets(
        &mut self,
        textures: &mut dyn TextureLoader,
        meshes: &mut dyn CorrectionMeshLoader,
    ) {
        if let Some(path) = &self.overlay_path {
            self.overlay_texture = textures.load_texture(path);
            if self.overlay_texture.is_none() {
                log::warn!("failed to load overlay texture {}", path.display());
            }
        }
        if let Some(path) = &self.mask_path {
            self.mask_texture = textures.load_texture(path);
            if self.mask_texture.is_none() {
                log::warn!("failed to load mask texture {}", path.display());
            }
        }
        if let Some(path) = &self.mesh_path {
            self.correction_mesh = meshes.load_mesh(path);
            if self.correction_mesh.is_none() {
                log::warn!("failed to load correction mesh {}", path.display());
            }
        }
    }

    pub fn has_overlay_texture(&self) -> bool {
        self.overlay_texture.is_some()
    }

    pub fn overlay_texture(&self) -> Option<TextureHandle> {
        self.overlay_texture
    }

    pub fn has_mask_texture(&self) -> bool {
        self.mask_texture.is_some()
    }

    pub fn mask_texture(&self) -> Option<TextureHandle> {
        self.mask_texture
    }

    pub fn has_correction_mesh(&self) -> bool {
        self.correction_mesh.is_some()
    }

    pub fn correction_mesh(&self) -> Option<&Arc<dyn CorrectionMesh>> {
        self.correction_mesh.as_ref()
    }

    /// Draws the correction-mesh pass if a mesh is present.
    pub fn render_mesh(&self, pass: MeshPass) {
        if let Some(mesh) = &self.correction_mesh {
            mesh.render(pass);
        }
    }

    fn store(&mut self, eye: Eye, matrices: FrustumMatrices) {
        self.matrices[eye.index()] = matrices;
        self.status[eye.index()] = FrustumStatus::Valid;
        log::debug!("viewport '{}': cached {:?} frustum", self.name, eye);
    }

    fn mark_geometry_changed(&mut self) {
        for status in &mut self.status {
            *status = match *status {
                FrustumStatus::Unconfigured | FrustumStatus::Configured => {
                    FrustumStatus::Configured
                }
                FrustumStatus::Valid | FrustumStatus::Stale => FrustumStatus::Stale,
            };
        }
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("name", &self.name)
            .field("rect", &self.rect)
            .field("eye", &self.eye)
            .field("enabled", &self.enabled)
            .field("tracked", &self.tracked)
            .field("status", &self.status)
            .field("has_correction_mesh", &self.correction_mesh.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn configured_viewport() -> Viewport {
        let mut viewport = Viewport::new();
        viewport
            .set_view_plane_from_fov(45.0, 45.0, 45.0, 45.0, Quat::IDENTITY, 2.0)
            .unwrap();
        viewport
    }

    #[test]
    fn test_new_viewport_defaults() {
        let viewport = Viewport::new();
        assert_eq!(viewport.rect(), NormalizedRect::default());
        assert_eq!(viewport.eye(), Eye::Mono);
        assert!(viewport.is_enabled());
        assert!(!viewport.is_tracked());
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Unconfigured);
        assert_eq!(viewport.view_matrix(Eye::Mono), Mat4::IDENTITY);
    }

    #[test]
    fn test_status_walks_the_cache_state_machine() {
        let mut viewport = Viewport::new();
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Unconfigured);

        viewport.set_view_plane_corner(PlaneCorner::LowerLeft, Vec3::new(-2.0, -1.0, -1.0));
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Configured);

        viewport
            .compute_frustum(Eye::Mono, Vec3::ZERO, 0.1, 100.0)
            .unwrap();
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Valid);
        // other eyes were not computed
        assert_eq!(
            viewport.frustum_status(Eye::StereoLeft),
            FrustumStatus::Configured
        );

        viewport.set_view_plane_corner(PlaneCorner::LowerLeft, Vec3::new(-3.0, -1.0, -1.0));
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Stale);

        viewport
            .compute_frustum(Eye::Mono, Vec3::ZERO, 0.1, 100.0)
            .unwrap();
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Valid);
    }

    #[test]
    fn test_failed_compute_keeps_cache_and_status() {
        let mut viewport = configured_viewport();
        viewport
            .compute_frustum(Eye::Mono, Vec3::ZERO, 0.1, 100.0)
            .unwrap();
        let cached_view = viewport.view_matrix(Eye::Mono);
        let cached_projection = viewport.projection_matrix(Eye::Mono);

        let result = viewport.compute_frustum(Eye::Mono, Vec3::ZERO, 5.0, 1.0);
        assert_eq!(
            result.unwrap_err(),
            ViewportError::InvalidClipRange {
                near: 5.0,
                far: 1.0
            }
        );
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Valid);
        assert_eq!(viewport.view_matrix(Eye::Mono), cached_view);
        assert_eq!(viewport.projection_matrix(Eye::Mono), cached_projection);
    }

    #[test]
    fn test_invalid_corner_index_leaves_corners_unchanged() {
        let mut viewport = configured_viewport();
        let before = *viewport.view_plane();
        let result = viewport.set_view_plane_corner_by_index(3, Vec3::ZERO);
        assert_eq!(result.unwrap_err(), ViewportError::InvalidIndex(3));
        assert_eq!(*viewport.view_plane(), before);
    }

    #[test]
    fn test_per_eye_caches_are_independent() {
        let mut viewport = configured_viewport();
        viewport
            .compute_frustum(Eye::StereoLeft, Vec3::new(-0.03, 0.0, 0.0), 0.1, 100.0)
            .unwrap();
        viewport
            .compute_frustum(Eye::StereoRight, Vec3::new(0.03, 0.0, 0.0), 0.1, 100.0)
            .unwrap();
        assert_ne!(
            viewport.projection_matrix(Eye::StereoLeft),
            viewport.projection_matrix(Eye::StereoRight)
        );
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Configured);
    }

    #[test]
    fn test_view_projection_matches_product() {
        let mut viewport = configured_viewport();
        viewport
            .compute_frustum(Eye::Mono, Vec3::new(0.2, 0.1, 0.4), 0.1, 100.0)
            .unwrap();
        assert_eq!(
            viewport.view_projection_matrix(Eye::Mono),
            viewport.projection_matrix(Eye::Mono) * viewport.view_matrix(Eye::Mono)
        );
    }

    #[test]
    fn test_fisheye_compute_caches_symmetric_frustum() {
        let mut viewport = configured_viewport();
        viewport
            .compute_fisheye_frustum(Eye::Mono, Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), 0.5, 50.0)
            .unwrap();
        let frustum = viewport.frustum(Eye::Mono);
        assert_eq!(frustum.left, -0.5);
        assert_eq!(frustum.right, 0.5);
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Valid);
    }

    struct StubTextures {
        issued: u32,
    }

    impl TextureLoader for StubTextures {
        fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
            if path.extension().is_some_and(|ext| ext == "png") {
                self.issued += 1;
                Some(TextureHandle(self.issued))
            } else {
                None
            }
        }
    }

    struct StubMesh;

    impl CorrectionMesh for StubMesh {
        fn render(&self, _pass: MeshPass) {}
    }

    struct StubMeshes;

    impl CorrectionMeshLoader for StubMeshes {
        fn load_mesh(&mut self, _path: &Path) -> Option<Arc<dyn CorrectionMesh>> {
            Some(Arc::new(StubMesh))
        }
    }

    #[test]
    fn test_load_assets_fills_slots() {
        let mut viewport = Viewport::new();
        viewport.set_overlay_texture_path("overlay.png");
        viewport.set_mask_texture_path("mask.bad");
        viewport.set_correction_mesh_path("warp.obj");

        let mut textures = StubTextures { issued: 0 };
        viewport.load_assets(&mut textures, &mut StubMeshes);

        assert!(viewport.has_overlay_texture());
        assert_eq!(viewport.overlay_texture(), Some(TextureHandle(1)));
        assert!(!viewport.has_mask_texture());
        assert!(viewport.has_correction_mesh());
    }

    #[test]
    fn test_dummy_reset_clears_assets() {
        let mut viewport = Viewport::new();
        viewport.set_overlay_texture_path("overlay.png");
        viewport.set_tracked(true);
        viewport.set_as_dummy();
        assert_eq!(viewport.name(), "dummy");
        assert!(viewport.is_enabled());
        assert!(!viewport.is_tracked());
        assert!(!viewport.has_overlay_texture());
        assert_eq!(viewport.frustum_status(Eye::Mono), FrustumStatus::Configured);
    }
}
