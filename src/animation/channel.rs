use glam::{Quat, Vec3};

use crate::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use crate::armature::Trs;
use crate::errors::Result;

/// Per-channel lookup caches, one for each property track.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCursor {
    pub position: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// One bone's animation data: three independently keyed tracks.
#[derive(Debug, Clone)]
pub struct Channel {
    pub position: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl Channel {
    #[must_use]
    pub fn new(
        position: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Builds a linearly interpolated channel from raw `(time, value)` keys.
    pub fn from_keys(
        positions: &[(f32, Vec3)],
        rotations: &[(f32, Quat)],
        scales: &[(f32, Vec3)],
    ) -> Result<Self> {
        Ok(Self {
            position: track_from_keys(positions)?,
            rotation: track_from_keys(rotations)?,
            scale: track_from_keys(scales)?,
        })
    }

    /// A channel that holds `pose` for the whole clip.
    #[must_use]
    pub fn constant(pose: Trs) -> Self {
        Self {
            position: KeyframeTrack::constant(pose.translation),
            rotation: KeyframeTrack::constant(pose.rotation),
            scale: KeyframeTrack::constant(pose.scale),
        }
    }

    /// Latest key time across the three tracks.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.position
            .end_time()
            .max(self.rotation.end_time())
            .max(self.scale.end_time())
    }

    /// Samples all three tracks at `time` (ticks).
    #[must_use]
    pub fn sample(&self, time: f32) -> Trs {
        Trs {
            translation: self.position.sample(time),
            rotation: self.rotation.sample(time),
            scale: self.scale.sample(time),
        }
    }

    pub fn sample_with_cursor(&self, time: f32, cursor: &mut ChannelCursor) -> Trs {
        Trs {
            translation: self.position.sample_with_cursor(time, &mut cursor.position),
            rotation: self.rotation.sample_with_cursor(time, &mut cursor.rotation),
            scale: self.scale.sample_with_cursor(time, &mut cursor.scale),
        }
    }
}

fn track_from_keys<T: crate::animation::values::Interpolatable>(
    keys: &[(f32, T)],
) -> Result<KeyframeTrack<T>> {
    let (times, values) = keys.iter().copied().unzip();
    KeyframeTrack::new(times, values, InterpolationMode::Linear)
}
