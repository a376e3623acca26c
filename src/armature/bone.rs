use glam::{Affine3A, Mat4};
use smallvec::SmallVec;

use crate::armature::attachment::AttachmentKey;
use crate::armature::trs::Trs;

/// Import-side description of a bone.
#[derive(Debug, Clone)]
pub struct BoneDesc {
    pub name: String,
    /// Index of the parent bone, which must already be in the armature.
    /// `None` for a root.
    pub parent: Option<usize>,
    /// Local offset from the parent in the rest pose.
    pub rest: Trs,
    /// Mesh space to bone space in the bind pose, for skinning.
    pub inverse_bind: Affine3A,
}

impl BoneDesc {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, rest: Trs) -> Self {
        Self {
            name: name.into(),
            parent,
            rest,
            inverse_bind: Affine3A::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_inverse_bind(mut self, inverse_bind: Affine3A) -> Self {
        self.inverse_bind = inverse_bind;
        self
    }
}

/// A node of an [`Armature`](super::Armature).
///
/// Holds the double-buffered pose used for render interpolation: the world
/// transform resolved on the last tick and the one before it.
#[derive(Debug, Clone)]
pub struct ArmatureBone {
    name: String,
    parent: Option<usize>,
    rest: Trs,
    inverse_bind: Affine3A,

    // === Per-tick state ===
    pub(crate) local: Trs,
    pub(crate) world_matrix: Affine3A,
    pub(crate) world: Trs,
    pub(crate) previous_world_matrix: Affine3A,
    pub(crate) previous_world: Trs,

    /// Keys of external objects parented to this bone.
    pub(crate) attachments: SmallVec<[AttachmentKey; 2]>,
}

impl ArmatureBone {
    pub(crate) fn from_desc(desc: BoneDesc) -> Self {
        Self {
            name: desc.name,
            parent: desc.parent,
            rest: desc.rest,
            inverse_bind: desc.inverse_bind,
            local: desc.rest,
            world_matrix: Affine3A::IDENTITY,
            world: Trs::IDENTITY,
            previous_world_matrix: Affine3A::IDENTITY,
            previous_world: Trs::IDENTITY,
            attachments: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn rest(&self) -> &Trs {
        &self.rest
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind(&self) -> &Affine3A {
        &self.inverse_bind
    }

    /// Local transform resolved on the last tick.
    #[inline]
    #[must_use]
    pub fn local(&self) -> &Trs {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn previous_world_matrix(&self) -> &Affine3A {
        &self.previous_world_matrix
    }

    /// World transform of the last tick, decomposed.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &Trs {
        &self.world
    }

    /// World transform of the tick before the last one.
    #[inline]
    #[must_use]
    pub fn previous_world(&self) -> &Trs {
        &self.previous_world
    }

    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[AttachmentKey] {
        &self.attachments
    }

    /// Current tick's world matrix, without interpolation.
    #[must_use]
    pub fn render_matrix(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    /// World matrix between the previous and current tick.
    ///
    /// `alpha` is the fraction of a fixed tick elapsed since the last update:
    /// `0` reproduces the previous tick, `1` the current one.
    #[must_use]
    pub fn render_matrix_interpolated(&self, alpha: f32) -> Mat4 {
        Mat4::from(self.interpolated_world_matrix(alpha))
    }

    /// Affine form of [`render_matrix_interpolated`](Self::render_matrix_interpolated).
    ///
    /// The endpoints return the composed matrices as stored, so shear from a
    /// non-uniformly scaled parent survives there. In between, the world TRS
    /// pair is blended and the shear is lost.
    #[must_use]
    pub fn interpolated_world_matrix(&self, alpha: f32) -> Affine3A {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha };
        if alpha >= 1.0 {
            self.world_matrix
        } else if alpha <= 0.0 {
            self.previous_world_matrix
        } else {
            self.previous_world.interpolate(&self.world, alpha).to_affine()
        }
    }

    #[must_use]
    pub fn interpolated_world(&self, alpha: f32) -> Trs {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
        self.previous_world.interpolate(&self.world, alpha)
    }

    /// Stores a freshly composed world matrix, shifting the old one into the
    /// previous slot.
    pub(crate) fn commit_world(&mut self, local: Trs, world_matrix: Affine3A) {
        self.previous_world = self.world;
        self.previous_world_matrix = self.world_matrix;
        self.local = local;
        self.world_matrix = world_matrix;
        self.world = Trs::from_affine(&world_matrix);
    }

    /// Sets both pose slots to `world_matrix`, so interpolation starts flat.
    pub(crate) fn reset_world(&mut self, local: Trs, world_matrix: Affine3A) {
        self.commit_world(local, world_matrix);
        self.previous_world = self.world;
        self.previous_world_matrix = self.world_matrix;
    }
}
