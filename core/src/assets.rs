//! Texture and correction-mesh collaborator interfaces
//!
//! Overlay textures, blend masks and warp meshes are owned by external
//! systems. A viewport only stores opaque handles and shared references,
//! obtained through the loader traits below.

use std::path::Path;
use std::sync::Arc;

/// Opaque GPU texture reference issued by a [`TextureLoader`].
///
/// Absence of a texture is expressed as `Option::None`; no handle value is
/// reserved as a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Loads image files into textures on behalf of a viewport.
pub trait TextureLoader {
    /// Returns a handle for the texture at `path`, or `None` when the file
    /// cannot be loaded.
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle>;
}

/// Which correction pass a mesh draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshPass {
    /// Screen-aligned quad (overlay and mask passes)
    Quad,
    /// Distortion-compensating warp geometry
    Warp,
}

/// Warp geometry applied to a viewport's rendered output to compensate for
/// display-surface distortion.
pub trait CorrectionMesh {
    /// Issues the draw pass for this mesh.
    fn render(&self, pass: MeshPass);
}

/// Produces renderable correction meshes from mesh description files.
pub trait CorrectionMeshLoader {
    /// Returns a shared mesh for the description at `path`, or `None` when
    /// the file cannot be loaded.
    fn load_mesh(&mut self, path: &Path) -> Option<Arc<dyn CorrectionMesh>>;
}
