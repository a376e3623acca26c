use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::animation::values::Interpolatable;

/// Translation, rotation and scale: the unit of pose state.
///
/// Composition goes through [`Affine3A`], matching the rest of the engine.
/// Decomposing a matrix that carries shear (non-uniform scale under a
/// rotated parent) drops the shear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Trs {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_affine(matrix: &Affine3A) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    #[must_use]
    pub fn from_mat4(matrix: &Mat4) -> Self {
        Self::from_affine(&Affine3A::from_mat4(*matrix))
    }

    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Lerps translation and scale, slerps rotation. `t = 0` yields `self`,
    /// `t = 1` yields `other`.
    #[must_use]
    pub fn interpolate(&self, other: &Trs, t: f32) -> Trs {
        Trs {
            translation: Vec3::interpolate_linear(self.translation, other.translation, t),
            rotation: Quat::interpolate_linear(self.rotation, other.rotation, t),
            scale: Vec3::interpolate_linear(self.scale, other.scale, t),
        }
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Trs> for Affine3A {
    fn from(trs: Trs) -> Self {
        trs.to_affine()
    }
}

impl From<Trs> for Mat4 {
    fn from(trs: Trs) -> Self {
        trs.to_mat4()
    }
}
