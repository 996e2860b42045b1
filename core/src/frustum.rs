//! Frustum construction
//!
//! Derives view and projection matrices for a viewport whose image plane is
//! an arbitrarily oriented quadrilateral in world space (the generalized
//! perspective projection), plus the symmetric single-pass frustum used for
//! fisheye/dome rendering.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ViewportError;
use crate::plane::{PlaneBasis, PlaneCorner, ViewPlane};

/// Which eye's matrix set a computation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Eye {
    /// Single centered eye
    #[default]
    Mono = 0,
    /// Left eye of a stereo pair
    StereoLeft = 1,
    /// Right eye of a stereo pair
    StereoRight = 2,
}

impl Eye {
    /// Number of eye modes.
    pub const COUNT: usize = 3;

    /// Converts a raw eye index from a configuration source.
    pub fn from_index(index: usize) -> Result<Self, ViewportError> {
        match index {
            0 => Ok(Self::Mono),
            1 => Ok(Self::StereoLeft),
            2 => Ok(Self::StereoRight),
            _ => Err(ViewportError::InvalidIndex(index)),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Signed near-plane extents and clip distances of a frustum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Asymmetric perspective projection matrix (the `glFrustum`
    /// construction). Requires `left < right`, `bottom < top` and
    /// `near < far`.
    pub fn projection_matrix(&self) -> Mat4 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let depth = self.far - self.near;
        Mat4::from_cols(
            Vec4::new(2.0 * self.near / width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * self.near / height, 0.0, 0.0),
            Vec4::new(
                (self.right + self.left) / width,
                (self.top + self.bottom) / height,
                -(self.far + self.near) / depth,
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * self.far * self.near / depth, 0.0),
        )
    }
}

/// Matrix set cached for one eye mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumMatrices {
    pub frustum: Frustum,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
}

impl Default for FrustumMatrices {
    fn default() -> Self {
        Self {
            frustum: Frustum::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        }
    }
}

/// Computes the off-axis frustum for an eye looking through `plane`.
///
/// The near-plane extents come from projecting the plane corners, relative
/// to the eye, onto the plane's own basis; the view matrix is the inverse of
/// the rigid transform whose rotation columns are that basis and whose
/// translation is the eye position. Pure arithmetic: identical inputs give
/// bit-identical matrices.
pub fn off_axis(
    plane: &ViewPlane,
    eye_position: Vec3,
    near: f32,
    far: f32,
) -> Result<FrustumMatrices, ViewportError> {
    validate_clip_range(near, far)?;
    let basis = plane.basis()?;

    let upper_left = plane.corner(PlaneCorner::UpperLeft);
    let distance = basis.normal.dot(eye_position - upper_left);
    if distance <= 0.0 {
        return Err(ViewportError::DegenerateGeometry(
            "eye position is on or behind the view plane",
        ));
    }

    let scale = near / distance;
    let to_lower_left = plane.corner(PlaneCorner::LowerLeft) - eye_position;
    let to_upper_right = plane.corner(PlaneCorner::UpperRight) - eye_position;
    let to_upper_left = upper_left - eye_position;

    let frustum = Frustum {
        left: basis.right.dot(to_lower_left) * scale,
        right: basis.right.dot(to_upper_right) * scale,
        bottom: basis.up.dot(to_lower_left) * scale,
        top: basis.up.dot(to_upper_left) * scale,
        near,
        far,
    };

    let view = view_matrix(&basis, eye_position);
    let projection = frustum.projection_matrix();
    Ok(FrustumMatrices {
        frustum,
        view,
        projection,
        view_projection: projection * view,
    })
}

/// Computes the symmetric fisheye/dome frustum for one cluster node.
///
/// The projection covers a fixed 90° single pass on both axes (near-plane
/// extents `±near`); `render_offset` shifts the notional eye so each node
/// renders its partition of the wide field. The view matrix uses the same
/// plane-basis construction as [`off_axis`].
pub fn fisheye(
    plane: &ViewPlane,
    eye_position: Vec3,
    render_offset: Vec3,
    near: f32,
    far: f32,
) -> Result<FrustumMatrices, ViewportError> {
    validate_clip_range(near, far)?;
    let basis = plane.basis()?;

    let frustum = Frustum {
        left: -near,
        right: near,
        bottom: -near,
        top: near,
        near,
        far,
    };
    let view = view_matrix(&basis, eye_position + render_offset);
    let projection = frustum.projection_matrix();
    Ok(FrustumMatrices {
        frustum,
        view,
        projection,
        view_projection: projection * view,
    })
}

fn validate_clip_range(near: f32, far: f32) -> Result<(), ViewportError> {
    if !(near > 0.0 && near < far && far.is_finite()) {
        return Err(ViewportError::InvalidClipRange { near, far });
    }
    Ok(())
}

/// Inverse of the rigid transform with rotation columns
/// `{right, up, normal}` and translation `eye`.
fn view_matrix(basis: &PlaneBasis, eye: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(basis.right.x, basis.up.x, basis.normal.x, 0.0),
        Vec4::new(basis.right.y, basis.up.y, basis.normal.y, 0.0),
        Vec4::new(basis.right.z, basis.up.z, basis.normal.z, 0.0),
        Vec4::new(
            -basis.right.dot(eye),
            -basis.up.dot(eye),
            -basis.normal.dot(eye),
            1.0,
        ),
    )
}
