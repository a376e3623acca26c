use std::sync::Arc;

use crate::animation::binder::{Binder, ClipBinding};
use crate::animation::channel::ChannelCursor;
use crate::animation::clip::Animation;
use crate::armature::{ArmatureBone, Trs};

/// One playing instance of a clip on a layer.
///
/// Time is tracked twice: `elapsed` is the playback clock that drives the
/// sample position and stops once a non-repeating clip completes, while the
/// blend clock always runs so a fade-in finishes even when the clip itself
/// is shorter than the fade. Both clocks accumulate in `f64`, so a long run
/// of fixed steps such as `1/60` s sums to the exact run time elapsed.
#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    animation: Arc<Animation>,
    binding: ClipBinding,
    channel_cursors: Vec<ChannelCursor>,

    elapsed: f64,
    blend_elapsed: f64,
    sample_time: f32,
    previous_sample_time: f32,
    cycle_count: u32,

    pub repeat: bool,
    blend_duration_ms: f32,
    blend_fraction: f32,
}

impl ActiveAnimation {
    #[must_use]
    pub fn new(animation: Arc<Animation>, binding: ClipBinding, repeat: bool, blend_duration_ms: f32) -> Self {
        let channel_count = animation.channels().len();
        let blend_duration_ms = if blend_duration_ms.is_finite() {
            blend_duration_ms.max(0.0)
        } else {
            0.0
        };

        let mut active = Self {
            animation,
            binding,
            channel_cursors: vec![ChannelCursor::default(); channel_count],
            elapsed: 0.0,
            blend_elapsed: 0.0,
            sample_time: 0.0,
            previous_sample_time: 0.0,
            cycle_count: 0,
            repeat,
            blend_duration_ms,
            blend_fraction: 0.0,
        };
        active.blend_fraction = active.compute_blend_fraction();
        active
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    /// Seconds of playback accumulated so far.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Current sample position in ticks.
    #[inline]
    #[must_use]
    pub fn sample_time(&self) -> f32 {
        self.sample_time
    }

    #[inline]
    #[must_use]
    pub fn previous_sample_time(&self) -> f32 {
        self.previous_sample_time
    }

    /// Number of completed cycles.
    #[inline]
    #[must_use]
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    #[inline]
    #[must_use]
    pub fn blend_duration_ms(&self) -> f32 {
        self.blend_duration_ms
    }

    /// Weight of this cursor against everything older in its chain, `0..=1`.
    #[inline]
    #[must_use]
    pub fn blend_fraction(&self) -> f32 {
        self.blend_fraction
    }

    #[inline]
    #[must_use]
    pub fn is_blend_complete(&self) -> bool {
        self.blend_fraction >= 1.0
    }

    /// A non-repeating cursor that has completed its cycle holds its last pose.
    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        !self.repeat && self.cycle_count > 0
    }

    #[inline]
    #[must_use]
    pub fn binding(&self) -> &ClipBinding {
        &self.binding
    }

    /// Advances the cursor by `step` seconds.
    pub fn advance(&mut self, step: f32) {
        self.advance_seconds(f64::from(step));
    }

    pub(crate) fn advance_seconds(&mut self, step: f64) {
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };

        self.blend_elapsed += step;
        self.blend_fraction = self.compute_blend_fraction();

        self.previous_sample_time = self.sample_time;
        if self.is_frozen() {
            return;
        }

        self.elapsed += step;

        let duration = f64::from(self.animation.duration());
        let ticks = self.elapsed * f64::from(self.animation.ticks_per_second());

        if !self.repeat && ticks >= duration {
            self.sample_time = self.animation.duration();
            self.cycle_count = 1;
            log::debug!(
                "Clip '{}' completed and is now frozen on its last pose",
                self.animation.name()
            );
            return;
        }

        self.sample_time = (ticks % duration) as f32;
        if self.sample_time < self.previous_sample_time {
            self.cycle_count += 1;
        }

        // A single long step can cross several cycle boundaries at once.
        let laps = (ticks / duration).floor() as u32;
        self.cycle_count = self.cycle_count.max(laps);
    }

    pub(crate) fn rebind(&mut self, bones: &[ArmatureBone]) {
        self.binding = Binder::bind(bones, &self.animation);
    }

    /// Samples the clip for `bone_index` at the current sample time, or `None`
    /// if this clip does not drive that bone.
    pub fn sample_bone(&mut self, bone_index: usize) -> Option<Trs> {
        let channel_index = self.binding.channel_for(bone_index)?;
        let channel = &self.animation.channels()[channel_index].channel;
        let cursor = &mut self.channel_cursors[channel_index];
        Some(channel.sample_with_cursor(self.sample_time, cursor))
    }

    fn compute_blend_fraction(&self) -> f32 {
        if self.blend_duration_ms <= 0.0 {
            return 1.0;
        }
        let blend_seconds = f64::from(self.blend_duration_ms) / 1000.0;
        (self.blend_elapsed / blend_seconds).min(1.0) as f32
    }
}
