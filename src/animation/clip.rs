use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::channel::Channel;
use crate::errors::{ArmatureError, Result};
use crate::settings::DEFAULT_TICKS_PER_SECOND;

/// A named bone channel inside a clip.
#[derive(Debug, Clone)]
pub struct BoneChannel {
    pub bone_name: String,
    pub channel: Channel,
}

/// An immutable animation clip.
///
/// Time inside a clip is measured in *ticks*; `ticks_per_second` maps
/// wall-clock seconds onto that domain. Clips are built once with
/// [`AnimationBuilder`] and then shared read-only (`Arc<Animation>`) by every
/// armature that plays them.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    channels: Vec<BoneChannel>,
    channel_lookup: FxHashMap<String, usize>,
    excluded_bones: FxHashSet<String>,
}

impl Animation {
    /// Starts building a clip. See [`AnimationBuilder::build`] for validation.
    pub fn builder(name: impl Into<String>, duration: f32, ticks_per_second: f32) -> AnimationBuilder {
        AnimationBuilder {
            name: name.into(),
            duration,
            ticks_per_second,
            channels: Vec::new(),
            excluded_bones: FxHashSet::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the clip in ticks.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Length of one cycle in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[BoneChannel] {
        &self.channels
    }

    /// Index of the channel animating `bone_name`, unless the bone is masked out.
    #[must_use]
    pub fn channel_index(&self, bone_name: &str) -> Option<usize> {
        if self.excluded_bones.contains(bone_name) {
            return None;
        }
        self.channel_lookup.get(bone_name).copied()
    }

    /// The channel animating `bone_name`, unless the bone is masked out.
    #[must_use]
    pub fn channel(&self, bone_name: &str) -> Option<&Channel> {
        self.channel_index(bone_name)
            .map(|index| &self.channels[index].channel)
    }

    #[must_use]
    pub fn excludes(&self, bone_name: &str) -> bool {
        self.excluded_bones.contains(bone_name)
    }
}

/// Collects channels and the exclusion mask for an [`Animation`].
#[derive(Debug, Clone)]
pub struct AnimationBuilder {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    channels: Vec<BoneChannel>,
    excluded_bones: FxHashSet<String>,
}

impl AnimationBuilder {
    /// Adds the channel for `bone_name`. A later channel for the same bone
    /// replaces the earlier one.
    #[must_use]
    pub fn channel(mut self, bone_name: impl Into<String>, channel: Channel) -> Self {
        let bone_name = bone_name.into();
        if let Some(existing) = self.channels.iter_mut().find(|c| c.bone_name == bone_name) {
            log::warn!(
                "Clip '{}' defines bone '{}' twice; keeping the last channel",
                self.name,
                bone_name
            );
            existing.channel = channel;
        } else {
            self.channels.push(BoneChannel { bone_name, channel });
        }
        self
    }

    /// Masks a bone out of the clip, even if a channel exists for it.
    #[must_use]
    pub fn exclude_bone(mut self, bone_name: impl Into<String>) -> Self {
        self.excluded_bones.insert(bone_name.into());
        self
    }

    /// Validates and freezes the clip.
    ///
    /// A rate of `0` means the source did not specify one and resolves to
    /// [`DEFAULT_TICKS_PER_SECOND`]. A non-positive duration or a negative or
    /// non-finite rate is rejected.
    pub fn build(self) -> Result<Animation> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ArmatureError::InvalidClip {
                name: self.name,
                reason: format!("duration must be positive, got {}", self.duration),
            });
        }

        let ticks_per_second = if self.ticks_per_second == 0.0 {
            log::debug!(
                "Clip '{}' has no tick rate, using {DEFAULT_TICKS_PER_SECOND}",
                self.name
            );
            DEFAULT_TICKS_PER_SECOND
        } else {
            self.ticks_per_second
        };
        if !ticks_per_second.is_finite() || ticks_per_second < 0.0 {
            return Err(ArmatureError::InvalidClip {
                name: self.name,
                reason: format!("ticks per second must be positive, got {ticks_per_second}"),
            });
        }

        for bone_channel in &self.channels {
            let end = bone_channel.channel.end_time();
            if end > self.duration {
                log::warn!(
                    "Clip '{}': channel '{}' has keys up to tick {end}, past the duration {}",
                    self.name,
                    bone_channel.bone_name,
                    self.duration
                );
            }
        }

        let channel_lookup = self
            .channels
            .iter()
            .enumerate()
            .map(|(index, c)| (c.bone_name.clone(), index))
            .collect();

        Ok(Animation {
            name: self.name,
            duration: self.duration,
            ticks_per_second,
            channels: self.channels,
            channel_lookup,
            excluded_bones: self.excluded_bones,
        })
    }
}
