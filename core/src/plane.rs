//! View-plane geometry
//!
//! Stores the three world-space corners that define a planar viewport and
//! derives them from field-of-view angles when a configuration supplies
//! angles instead of explicit corners.

use glam::{Quat, Vec3, Vec4};

use crate::error::ViewportError;

/// Conventional distance from the eye to an FOV-derived view plane.
pub const DEFAULT_PLANE_DISTANCE: f32 = 10.0;

/// Below this squared length a basis vector counts as zero.
const MIN_BASIS_LENGTH_SQ: f32 = 1e-12;

/// Identifies one of the three stored view-plane corners.
///
/// The lower-right corner is implied: the plane is a parallelogram, so
/// `lower_right = upper_right + lower_left - upper_left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneCorner {
    LowerLeft = 0,
    UpperLeft = 1,
    UpperRight = 2,
}

impl PlaneCorner {
    /// Number of stored corners.
    pub const COUNT: usize = 3;

    /// Converts a raw corner index from a configuration source.
    pub fn from_index(index: usize) -> Result<Self, ViewportError> {
        match index {
            0 => Ok(Self::LowerLeft),
            1 => Ok(Self::UpperLeft),
            2 => Ok(Self::UpperRight),
            _ => Err(ViewportError::InvalidIndex(index)),
        }
    }
}

/// Planar viewport geometry in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPlane {
    corners: [Vec3; PlaneCorner::COUNT],
}

impl Default for ViewPlane {
    /// 90°×90° plane at distance 1, straight ahead on -Z.
    fn default() -> Self {
        Self {
            corners: [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
            ],
        }
    }
}

impl ViewPlane {
    /// Creates a plane from explicit lower-left, upper-left and upper-right
    /// corners.
    pub fn from_corners(lower_left: Vec3, upper_left: Vec3, upper_right: Vec3) -> Self {
        Self {
            corners: [lower_left, upper_left, upper_right],
        }
    }

    /// Returns a stored corner.
    pub fn corner(&self, corner: PlaneCorner) -> Vec3 {
        self.corners[corner as usize]
    }

    /// Returns the implied fourth corner.
    pub fn lower_right(&self) -> Vec3 {
        self.corner(PlaneCorner::UpperRight) + self.corner(PlaneCorner::LowerLeft)
            - self.corner(PlaneCorner::UpperLeft)
    }

    /// Stores a corner position.
    pub fn set_corner(&mut self, corner: PlaneCorner, position: Vec3) {
        self.corners[corner as usize] = position;
    }

    /// Stores a corner from a homogeneous position.
    ///
    /// Divides by `w` first when `w` is non-zero; a zero `w` stores the xyz
    /// part unchanged.
    pub fn set_corner_homogeneous(&mut self, corner: PlaneCorner, position: Vec4) {
        let cartesian = if position.w != 0.0 {
            position.truncate() / position.w
        } else {
            position.truncate()
        };
        self.set_corner(corner, cartesian);
    }

    /// Derives the corners from field-of-view half-angles and an orientation.
    ///
    /// Angles are in degrees, measured from the view axis: `left`/`right`
    /// horizontally, `up`/`down` vertically. Each must stay below 90° in
    /// magnitude and the combined span per axis below 180°. The plane is
    /// placed `distance` units ahead on -Z before `orientation` is applied.
    /// On error the stored corners are unchanged.
    pub fn set_from_fov(
        &mut self,
        up: f32,
        down: f32,
        left: f32,
        right: f32,
        orientation: Quat,
        distance: f32,
    ) -> Result<(), ViewportError> {
        let angles = [up, down, left, right];
        let invalid = angles.iter().any(|a| !a.is_finite() || a.abs() >= 90.0)
            || left + right >= 180.0
            || up + down >= 180.0;
        if invalid {
            return Err(ViewportError::InvalidFov {
                up,
                down,
                left,
                right,
            });
        }

        let tan_up = up.to_radians().tan();
        let tan_down = down.to_radians().tan();
        let tan_left = left.to_radians().tan();
        let tan_right = right.to_radians().tan();

        self.corners = [
            orientation * (Vec3::new(-tan_left, -tan_down, -1.0) * distance),
            orientation * (Vec3::new(-tan_left, tan_up, -1.0) * distance),
            orientation * (Vec3::new(tan_right, tan_up, -1.0) * distance),
        ];
        Ok(())
    }

    /// Orthonormal in-plane basis plus outward normal.
    ///
    /// The normal points toward the eye side of a viewer-facing plane.
    pub(crate) fn basis(&self) -> Result<PlaneBasis, ViewportError> {
        let right = self.corner(PlaneCorner::UpperRight) - self.corner(PlaneCorner::UpperLeft);
        let up = self.corner(PlaneCorner::UpperLeft) - self.corner(PlaneCorner::LowerLeft);
        if right.length_squared() < MIN_BASIS_LENGTH_SQ
            || up.length_squared() < MIN_BASIS_LENGTH_SQ
        {
            return Err(ViewportError::DegenerateGeometry(
                "zero-length view plane edge",
            ));
        }
        let right = right.normalize();
        let up = up.normalize();
        let normal = right.cross(up);
        if normal.length_squared() < MIN_BASIS_LENGTH_SQ {
            return Err(ViewportError::DegenerateGeometry(
                "view plane corners are collinear",
            ));
        }
        Ok(PlaneBasis {
            right,
            up,
            normal: normal.normalize(),
        })
    }
}

/// Orthonormal frame of a view plane.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaneBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_round_trip() {
        let mut plane = ViewPlane::default();
        let position = Vec3::new(1.5, -2.0, -7.25);
        plane.set_corner(PlaneCorner::UpperRight, position);
        assert_eq!(plane.corner(PlaneCorner::UpperRight), position);
    }

    #[test]
    fn test_corner_from_index_rejects_out_of_range() {
        assert_eq!(PlaneCorner::from_index(1), Ok(PlaneCorner::UpperLeft));
        assert_eq!(
            PlaneCorner::from_index(3),
            Err(ViewportError::InvalidIndex(3))
        );
    }

    #[test]
    fn test_homogeneous_corner_divides_by_w() {
        let mut plane = ViewPlane::default();
        plane.set_corner_homogeneous(PlaneCorner::LowerLeft, Vec4::new(2.0, 4.0, 6.0, 2.0));
        assert_eq!(plane.corner(PlaneCorner::LowerLeft), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_homogeneous_corner_zero_w_keeps_xyz() {
        let mut plane = ViewPlane::default();
        plane.set_corner_homogeneous(PlaneCorner::LowerLeft, Vec4::new(2.0, 4.0, 6.0, 0.0));
        assert_eq!(plane.corner(PlaneCorner::LowerLeft), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_lower_right_completes_the_parallelogram() {
        let plane = ViewPlane::from_corners(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
        );
        assert_eq!(plane.lower_right(), Vec3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn test_fov_corners_symmetric_for_equal_angles() {
        let mut plane = ViewPlane::default();
        plane
            .set_from_fov(10.0, 10.0, 10.0, 10.0, Quat::IDENTITY, 10.0)
            .unwrap();
        let offset = 10.0 * 10.0f32.to_radians().tan();
        let lower_left = plane.corner(PlaneCorner::LowerLeft);
        let upper_left = plane.corner(PlaneCorner::UpperLeft);
        let upper_right = plane.corner(PlaneCorner::UpperRight);
        for corner in [lower_left, upper_left, upper_right] {
            assert!((corner.x.abs() - offset).abs() < 1e-5);
            assert!((corner.y.abs() - offset).abs() < 1e-5);
            assert!((corner.z - -10.0).abs() < 1e-5);
        }
        assert!(lower_left.x < 0.0 && lower_left.y < 0.0);
        assert!(upper_left.x < 0.0 && upper_left.y > 0.0);
        assert!(upper_right.x > 0.0 && upper_right.y > 0.0);
    }

    #[test]
    fn test_fov_rejects_half_angle_at_90_degrees() {
        let mut plane = ViewPlane::default();
        let before = plane;
        let result = plane.set_from_fov(90.0, 10.0, 10.0, 10.0, Quat::IDENTITY, 10.0);
        assert!(matches!(result, Err(ViewportError::InvalidFov { .. })));
        assert_eq!(plane, before);
    }

    #[test]
    fn test_fov_applies_orientation() {
        let mut plane = ViewPlane::default();
        // quarter turn about Y moves the plane from -Z onto -X
        let orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        plane
            .set_from_fov(10.0, 10.0, 10.0, 10.0, orientation, 10.0)
            .unwrap();
        let upper_left = plane.corner(PlaneCorner::UpperLeft);
        assert!((upper_left.x - -10.0).abs() < 1e-4);
    }

    #[test]
    fn test_basis_rejects_collinear_corners() {
        let plane = ViewPlane::from_corners(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(2.0, 0.0, -1.0),
        );
        assert!(matches!(
            plane.basis(),
            Err(ViewportError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_basis_rejects_coincident_corners() {
        let corner = Vec3::new(0.0, 0.0, -1.0);
        let plane = ViewPlane::from_corners(corner, corner, Vec3::new(1.0, 0.0, -1.0));
        assert!(matches!(
            plane.basis(),
            Err(ViewportError::DegenerateGeometry(_))
        ));
    }
}
