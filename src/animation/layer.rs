use std::collections::VecDeque;

use crate::animation::action::ActiveAnimation;
use crate::armature::{ArmatureBone, Trs};

/// Identifies a layer on one [`Armature`](crate::armature::Armature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) usize);

impl LayerId {
    /// The layer every armature is created with.
    pub const BASE: LayerId = LayerId(0);

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An independent blend channel: a chain of cursors, oldest first, and the
/// per-bone pose it resolved on the last tick.
#[derive(Debug, Clone)]
pub struct AnimationLayer {
    name: String,
    chain: VecDeque<ActiveAnimation>,
    pose: Vec<Option<Trs>>,
    last_run_time: Option<f32>,
}

impl AnimationLayer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: VecDeque::new(),
            pose: Vec::new(),
            last_run_time: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cursors from oldest to newest.
    pub fn chain(&self) -> impl ExactSizeIterator<Item = &ActiveAnimation> {
        self.chain.iter()
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.chain.is_empty()
    }

    /// The most recently started cursor.
    #[must_use]
    pub fn front(&self) -> Option<&ActiveAnimation> {
        self.chain.back()
    }

    /// Resolved local pose of `bone_index` on the last tick, if this layer
    /// drives that bone.
    #[must_use]
    pub fn pose(&self, bone_index: usize) -> Option<Trs> {
        self.pose.get(bone_index).copied().flatten()
    }

    /// Appends a cursor, dropping the oldest ones beyond `max_chain_length`.
    pub fn push(&mut self, cursor: ActiveAnimation, max_chain_length: usize) {
        log::debug!(
            "Layer '{}': playing '{}' (repeat: {}, blend: {} ms)",
            self.name,
            cursor.animation().name(),
            cursor.repeat,
            cursor.blend_duration_ms()
        );
        self.chain.push_back(cursor);

        let max_chain_length = max_chain_length.max(1);
        while self.chain.len() > max_chain_length {
            if let Some(dropped) = self.chain.pop_front() {
                log::warn!(
                    "Layer '{}': more than {max_chain_length} clips blending, dropping '{}'",
                    self.name,
                    dropped.animation().name()
                );
            }
        }
    }

    /// Re-resolves every cursor's bone binding after the bone list changed.
    pub(crate) fn rebind(&mut self, bones: &[ArmatureBone]) {
        for cursor in &mut self.chain {
            cursor.rebind(bones);
        }
    }

    /// Removes every cursor and forgets the resolved pose.
    pub fn clear(&mut self) {
        self.chain.clear();
        self.pose.iter_mut().for_each(|slot| *slot = None);
    }

    /// Converts an absolute run time into a step for this layer.
    ///
    /// The first call yields zero, as does a run time that moves backwards.
    /// The difference is taken in `f64` so successive steps sum to the total
    /// time elapsed without rounding drift.
    pub(crate) fn step_to(&mut self, run_time: f32) -> f64 {
        let step = match self.last_run_time {
            None => 0.0,
            Some(last) if run_time < last => {
                log::warn!(
                    "Layer '{}': run time went backwards ({last} -> {run_time}), holding",
                    self.name
                );
                0.0
            }
            Some(last) => f64::from(run_time) - f64::from(last),
        };
        self.last_run_time = Some(self.last_run_time.map_or(run_time, |last| last.max(run_time)));
        step
    }

    /// Advances every cursor, then discards cursors that a fully blended-in
    /// successor has superseded.
    pub(crate) fn advance(&mut self, step: f64) {
        for cursor in &mut self.chain {
            cursor.advance_seconds(step);
        }

        if let Some(newest_complete) = self.chain.iter().rposition(ActiveAnimation::is_blend_complete) {
            for superseded in self.chain.drain(..newest_complete) {
                log::debug!(
                    "Layer '{}': '{}' fully blended out",
                    self.name,
                    superseded.animation().name()
                );
            }
        }
    }

    /// Resolves this layer's local pose for every bone.
    ///
    /// Blending cascades: the oldest contributing sample is taken as-is and
    /// every newer cursor pulls the accumulated result toward its own sample
    /// by its blend fraction. A newer cursor that is the first to drive a bone
    /// blends from the bone's rest pose instead.
    pub fn evaluate(&mut self, rest_pose: &[Trs]) {
        self.pose.resize(rest_pose.len(), None);

        for (bone_index, rest) in rest_pose.iter().enumerate() {
            let mut blended: Option<Trs> = None;

            for (position, cursor) in self.chain.iter_mut().enumerate() {
                let Some(sample) = cursor.sample_bone(bone_index) else {
                    continue;
                };
                blended = Some(match blended {
                    None if position == 0 => sample,
                    None => rest.interpolate(&sample, cursor.blend_fraction()),
                    Some(acc) => acc.interpolate(&sample, cursor.blend_fraction()),
                });
            }

            self.pose[bone_index] = blended;
        }
    }
}
