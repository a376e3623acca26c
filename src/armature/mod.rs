//! Armature
//!
//! An [`Armature`] is one skeleton instance: an ordered bone list, the clips it
//! may play, a set of [`AnimationLayer`]s and the double-buffered pose used to
//! interpolate between fixed ticks.
//!
//! # Tick flow
//!
//! 1. [`Armature::update_animations`] (or [`Armature::update_layer`]) advances
//!    the cursors of each layer by the step since that layer's last update.
//! 2. Each layer resolves a local pose per bone by cascading its cross-fades.
//! 3. Bones are walked in index order. Every parent precedes its children
//!    (enforced by [`Armature::add_bone`]), so a single flat pass composes the
//!    world transforms top-down.
//! 4. The new world transform is stored and the old one is kept for
//!    [`ArmatureBone::render_matrix_interpolated`].
//!
//! # Layers
//!
//! Layers are evaluated independently. The armature then builds one skeletal
//! pose by override: a bone starts from its rest pose and every layer, in
//! ascending [`LayerId`] order, that drives the bone replaces it. Consumers
//! needing another policy can read [`Armature::layer_pose`].

pub mod attachment;
pub mod bone;
pub mod trs;

pub use attachment::{AttachmentKey, DetachCallback, DetachReason};
pub use bone::{ArmatureBone, BoneDesc};
pub use trs::Trs;

use std::sync::Arc;

use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;

use crate::animation::action::ActiveAnimation;
use crate::animation::binder::Binder;
use crate::animation::clip::Animation;
use crate::animation::layer::{AnimationLayer, LayerId};
use crate::armature::attachment::AttachmentRegistry;
use crate::errors::{ArmatureError, Result};
use crate::settings::AnimationSettings;

const BASE_LAYER_NAME: &str = "base";

#[derive(Debug)]
pub struct Armature {
    name: String,
    settings: AnimationSettings,

    // === Skeleton ===
    bones: Vec<ArmatureBone>,
    bone_lookup: FxHashMap<String, usize>,
    world_transform: Affine3A,

    // === Playback ===
    animations: FxHashMap<String, Arc<Animation>>,
    layers: Vec<AnimationLayer>,
    run_time: f32,
    previous_run_time: f32,
    ticked: bool,

    // === Outputs ===
    skin_matrices: Vec<Mat4>,
    attachments: AttachmentRegistry,
}

impl Armature {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(name: impl Into<String>, settings: AnimationSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            bones: Vec::new(),
            bone_lookup: FxHashMap::default(),
            world_transform: Affine3A::IDENTITY,
            animations: FxHashMap::default(),
            layers: vec![AnimationLayer::new(BASE_LAYER_NAME)],
            run_time: 0.0,
            previous_run_time: 0.0,
            ticked: false,
            skin_matrices: Vec::new(),
            attachments: AttachmentRegistry::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    // ========================================================================
    // Skeleton construction
    // ========================================================================

    /// Appends a bone and returns its index.
    ///
    /// The parent must already be in the armature, which keeps the bone list
    /// in parent-before-child order for the flat update walk.
    pub fn add_bone(&mut self, desc: BoneDesc) -> Result<usize> {
        if self.ticked {
            return Err(ArmatureError::ArmatureFrozen(self.name.clone()));
        }
        if self.bone_lookup.contains_key(&desc.name) {
            return Err(ArmatureError::DuplicateBone(desc.name));
        }

        let index = self.bones.len();
        if let Some(parent) = desc.parent
            && parent >= index
        {
            return Err(ArmatureError::InvalidHierarchy {
                bone: desc.name,
                index,
                parent,
            });
        }

        let mut bone = ArmatureBone::from_desc(desc);
        let rest = *bone.rest();
        let world = self.parent_matrix(bone.parent()) * rest.to_affine();
        bone.reset_world(rest, world);

        self.bone_lookup.insert(bone.name().to_owned(), index);
        self.bones.push(bone);

        // Clips may already be queued; let them pick up the new bone.
        for layer in &mut self.layers {
            layer.rebind(&self.bones);
        }
        Ok(index)
    }

    /// Like [`add_bone`](Self::add_bone), resolving the parent by name.
    pub fn add_bone_with_parent_name(
        &mut self,
        name: impl Into<String>,
        parent: Option<&str>,
        rest: Trs,
    ) -> Result<usize> {
        let parent = parent.map(|p| self.find_bone(p)).transpose()?;
        self.add_bone(BoneDesc::new(name, parent, rest))
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[ArmatureBone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> &ArmatureBone {
        &self.bones[index]
    }

    #[inline]
    #[must_use]
    pub fn try_bone(&self, index: usize) -> Option<&ArmatureBone> {
        self.bones.get(index)
    }

    pub fn find_bone(&self, name: &str) -> Result<usize> {
        self.bone_lookup
            .get(name)
            .copied()
            .ok_or_else(|| ArmatureError::BoneNotFound(name.to_owned()))
    }

    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> &Affine3A {
        &self.world_transform
    }

    /// Places the whole skeleton in the world. Takes effect on the next tick.
    pub fn set_world_transform(&mut self, transform: Affine3A) {
        self.world_transform = transform;
    }

    // ========================================================================
    // Clips & layers
    // ========================================================================

    /// Makes `animation` playable on this armature.
    pub fn add_animation(&mut self, animation: Arc<Animation>) -> Result<()> {
        if self.animations.contains_key(animation.name()) {
            return Err(ArmatureError::DuplicateClip(animation.name().to_owned()));
        }

        let unmatched = Binder::unmatched_channels(&self.bones, &animation);
        if !unmatched.is_empty() {
            log::warn!(
                "Armature '{}': clip '{}' has channels for unknown bones {:?}",
                self.name,
                animation.name(),
                unmatched
            );
        }

        self.animations
            .insert(animation.name().to_owned(), animation);
        Ok(())
    }

    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.get(name)
    }

    pub fn animations(&self) -> impl Iterator<Item = &Arc<Animation>> {
        self.animations.values()
    }

    /// Adds an empty layer evaluated after every existing one.
    pub fn add_layer(&mut self, name: impl Into<String>) -> Result<LayerId> {
        let name = name.into();
        if self.layers.iter().any(|layer| layer.name() == name) {
            return Err(ArmatureError::DuplicateLayer(name));
        }
        self.layers.push(AnimationLayer::new(name));
        Ok(LayerId(self.layers.len() - 1))
    }

    pub fn layer_id(&self, name: &str) -> Result<LayerId> {
        self.layers
            .iter()
            .position(|layer| layer.name() == name)
            .map(LayerId)
            .ok_or_else(|| ArmatureError::LayerNotFound(name.to_owned()))
    }

    #[must_use]
    pub fn layer(&self, layer: LayerId) -> Option<&AnimationLayer> {
        self.layers.get(layer.0)
    }

    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Local pose `layer` resolved for `bone_index` on the last tick.
    #[must_use]
    pub fn layer_pose(&self, layer: LayerId, bone_index: usize) -> Option<Trs> {
        self.layers.get(layer.0)?.pose(bone_index)
    }

    /// Starts `clip_name` on `layer`, cross-fading over `blend_ms`
    /// milliseconds from whatever the layer is playing.
    pub fn play_animation(
        &mut self,
        layer: LayerId,
        clip_name: &str,
        repeat: bool,
        blend_ms: f32,
    ) -> Result<()> {
        let animation = self
            .animations
            .get(clip_name)
            .cloned()
            .ok_or_else(|| ArmatureError::ClipNotFound(clip_name.to_owned()))?;

        let binding = Binder::bind(&self.bones, &animation);
        let max_chain_length = self.settings.max_chain_length;
        let target = self.layer_mut(layer)?;

        target.push(
            ActiveAnimation::new(animation, binding, repeat, blend_ms),
            max_chain_length,
        );
        Ok(())
    }

    /// Stops everything playing on `layer`; its bones fall back to lower
    /// layers or the rest pose on the next tick.
    pub fn stop_layer(&mut self, layer: LayerId) -> Result<()> {
        self.layer_mut(layer)?.clear();
        Ok(())
    }

    fn layer_mut(&mut self, layer: LayerId) -> Result<&mut AnimationLayer> {
        let count = self.layers.len();
        self.layers
            .get_mut(layer.0)
            .ok_or(ArmatureError::LayerIndexOutOfRange {
                index: layer.0,
                count,
            })
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Monotonic time of the latest update, in seconds.
    #[inline]
    #[must_use]
    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    /// Time of the update before the latest one.
    #[inline]
    #[must_use]
    pub fn previous_run_time(&self) -> f32 {
        self.previous_run_time
    }

    /// Advances a single layer to `run_time` and recomputes every bone.
    pub fn update_layer(&mut self, layer: LayerId, run_time: f32) {
        let rest_pose = self.rest_pose();
        let Some(target) = self.layers.get_mut(layer.0) else {
            log::warn!(
                "Armature '{}': update of unknown layer #{} ignored",
                self.name,
                layer.0
            );
            return;
        };

        let step = target.step_to(run_time);
        target.advance(step);
        if !rest_pose.is_empty() {
            target.evaluate(&rest_pose);
        }

        self.advance_run_time(run_time);
        self.resolve_hierarchy();
    }

    /// Advances every layer to `run_time` and recomputes every bone.
    pub fn update_animations(&mut self, run_time: f32) {
        let rest_pose = self.rest_pose();
        for layer in &mut self.layers {
            let step = layer.step_to(run_time);
            layer.advance(step);
            if !rest_pose.is_empty() {
                layer.evaluate(&rest_pose);
            }
        }

        self.advance_run_time(run_time);
        self.resolve_hierarchy();
    }

    fn advance_run_time(&mut self, run_time: f32) {
        if run_time > self.run_time {
            self.previous_run_time = self.run_time;
            self.run_time = run_time;
        }
    }

    fn rest_pose(&self) -> Vec<Trs> {
        self.bones.iter().map(|bone| *bone.rest()).collect()
    }

    fn parent_matrix(&self, parent: Option<usize>) -> Affine3A {
        match parent {
            Some(index) => self.bones[index].world_matrix,
            None => self.world_transform,
        }
    }

    /// Composes local poses into world transforms, root first.
    fn resolve_hierarchy(&mut self) {
        if self.bones.is_empty() {
            return;
        }
        self.ticked = true;

        for index in 0..self.bones.len() {
            let local = self
                .layers
                .iter()
                .rev()
                .find_map(|layer| layer.pose(index))
                .unwrap_or(*self.bones[index].rest());

            let world = self.parent_matrix(self.bones[index].parent()) * local.to_affine();
            self.bones[index].commit_world(local, world);
        }

        log::trace!(
            "Armature '{}': resolved {} bones at t={}",
            self.name,
            self.bones.len(),
            self.run_time
        );
    }

    // ========================================================================
    // Render queries
    // ========================================================================

    /// Current tick's world matrix of bone `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn bone_world_matrix(&self, index: usize) -> Mat4 {
        self.bones[index].render_matrix()
    }

    /// World matrix of bone `index` interpolated between the last two ticks.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn bone_world_matrix_interpolated(&self, index: usize, alpha: f32) -> Mat4 {
        self.bones[index].render_matrix_interpolated(alpha)
    }

    /// Computes the joint matrices for skinning at `alpha`.
    ///
    /// Each matrix takes a vertex from mesh space into the bone's animated
    /// space: `world_transform⁻¹ * bone_world(alpha) * inverse_bind`. The
    /// armature's own placement is cancelled out so the mesh can keep its own
    /// model matrix.
    pub fn compute_skin_matrices(&mut self, alpha: f32) -> &[Mat4] {
        let root_inv = self.world_transform.inverse();
        self.skin_matrices.clear();
        self.skin_matrices.extend(self.bones.iter().map(|bone| {
            Mat4::from(root_inv * bone.interpolated_world_matrix(alpha) * *bone.inverse_bind())
        }));
        &self.skin_matrices
    }

    /// Matrices from the last [`compute_skin_matrices`](Self::compute_skin_matrices).
    #[inline]
    #[must_use]
    pub fn skin_matrices(&self) -> &[Mat4] {
        &self.skin_matrices
    }

    /// The skin matrices as raw bytes, ready for a storage buffer upload.
    #[must_use]
    pub fn skin_matrix_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.skin_matrices)
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Parents an external object to `bone` without a detach notification.
    pub fn attach(&mut self, bone: usize) -> Result<AttachmentKey> {
        self.attach_inner(bone, None)
    }

    /// Parents an external object to `bone`. `on_detach` runs once when the
    /// attachment ends, including when this armature is dropped.
    pub fn attach_with_callback<F>(&mut self, bone: usize, on_detach: F) -> Result<AttachmentKey>
    where
        F: FnMut(AttachmentKey, DetachReason) + Send + 'static,
    {
        self.attach_inner(bone, Some(Box::new(on_detach)))
    }

    fn attach_inner(&mut self, bone: usize, on_detach: Option<DetachCallback>) -> Result<AttachmentKey> {
        let count = self.bones.len();
        let target = self
            .bones
            .get_mut(bone)
            .ok_or(ArmatureError::BoneIndexOutOfRange { index: bone, count })?;

        let key = self.attachments.insert(bone, on_detach);
        target.attachments.push(key);
        Ok(key)
    }

    /// Ends an attachment. Returns `false` for a key that is no longer valid.
    pub fn detach(&mut self, key: AttachmentKey) -> bool {
        let Some(bone) = self.attachments.remove(key, DetachReason::Detached) else {
            return false;
        };
        if let Some(owner) = self.bones.get_mut(bone) {
            owner.attachments.retain(|k| *k != key);
        }
        true
    }

    /// Bone an attachment follows, or `None` for a stale key.
    #[must_use]
    pub fn attachment_bone(&self, key: AttachmentKey) -> Option<usize> {
        self.attachments.bone_of(key)
    }

    /// Interpolated world matrix for an attached object, or `None` for a
    /// stale key.
    #[must_use]
    pub fn attachment_matrix(&self, key: AttachmentKey, alpha: f32) -> Option<Mat4> {
        let bone = self.attachments.bone_of(key)?;
        self.bones
            .get(bone)
            .map(|b| b.render_matrix_interpolated(alpha))
    }

    #[inline]
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }
}

/// Clones the skeleton, clips and playback state into an independent
/// instance. Attachments stay with the original.
impl Clone for Armature {
    fn clone(&self) -> Self {
        let mut bones = self.bones.clone();
        for bone in &mut bones {
            bone.attachments.clear();
        }

        Self {
            name: self.name.clone(),
            settings: self.settings,
            bones,
            bone_lookup: self.bone_lookup.clone(),
            world_transform: self.world_transform,
            animations: self.animations.clone(),
            layers: self.layers.clone(),
            run_time: self.run_time,
            previous_run_time: self.previous_run_time,
            ticked: self.ticked,
            skin_matrices: self.skin_matrices.clone(),
            attachments: AttachmentRegistry::default(),
        }
    }
}
