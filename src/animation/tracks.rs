use crate::animation::values::Interpolatable;
use crate::errors::{ArmatureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// Keys closer than this are treated as coincident.
const MIN_SEGMENT_WIDTH: f32 = 1e-6;

/// Remembers the segment used by the previous lookup so that forward
/// playback does not have to binary-search every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// One property's keys: strictly increasing `times` with one value per time.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track, rejecting data the sampler cannot bracket.
    ///
    /// A single key is accepted and held constant; an empty track is not.
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if times.is_empty() {
            return Err(ArmatureError::InvalidTrack("track has no keys".into()));
        }
        if times.len() != values.len() {
            return Err(ArmatureError::InvalidTrack(format!(
                "{} key times but {} values",
                times.len(),
                values.len()
            )));
        }
        if let Some(bad) = times.iter().position(|t| !t.is_finite()) {
            return Err(ArmatureError::InvalidTrack(format!(
                "key {bad} has a non-finite time"
            )));
        }
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ArmatureError::InvalidTrack(format!(
                "key times must be strictly increasing (key {} at {} follows {})",
                i + 1,
                times[i + 1],
                times[i]
            )));
        }

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// A track holding `value` for all time.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
            interpolation: InterpolationMode::Step,
        }
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    /// Time of the last key.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples the track at `time` (in ticks).
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.times.len() == 1 {
            return self.values[0];
        }
        let segment = self.find_segment(time);
        self.sample_segment(segment, time)
    }

    /// Same result as [`sample`](Self::sample), but starts from the segment
    /// cached in `cursor` and only falls back to a binary search on a miss.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        if self.times.len() == 1 {
            return self.values[0];
        }

        let last_segment = self.times.len() - 2;
        let cached = cursor.last_index.min(last_segment);

        // The cached segment or the one right after it covers sequential playback.
        let segment = if self.segment_contains(cached, time) {
            cached
        } else if cached < last_segment && self.segment_contains(cached + 1, time) {
            cached + 1
        } else {
            self.find_segment(time)
        };

        cursor.last_index = segment;
        self.sample_segment(segment, time)
    }

    /// Upper-bound search, step back one, clamped to `[0, len - 2]` so that a
    /// time at or past the last key still lands on the final segment.
    fn find_segment(&self, time: f32) -> usize {
        let upper = self.times.partition_point(|&t| t <= time);
        upper.saturating_sub(1).min(self.times.len() - 2)
    }

    /// Whether `segment` is the one `find_segment` would pick for `time`.
    fn segment_contains(&self, segment: usize, time: f32) -> bool {
        let last_segment = self.times.len() - 2;
        let after_start = segment == 0 || time >= self.times[segment];
        let before_end = segment == last_segment || time < self.times[segment + 1];
        after_start && before_end
    }

    fn sample_segment(&self, index: usize, time: f32) -> T {
        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        let width = t1 - t0;

        let f = if width > MIN_SEGMENT_WIDTH {
            ((time - t0) / width).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => {
                if f >= 1.0 {
                    self.values[index + 1]
                } else {
                    self.values[index]
                }
            }
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[index + 1], f)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> KeyframeTrack<f32> {
        KeyframeTrack::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![0.0, 10.0, 20.0, 30.0],
            InterpolationMode::Linear,
        )
        .unwrap()
    }

    #[test]
    fn find_segment_is_clamped_to_last_pair() {
        let track = ramp();
        assert_eq!(track.find_segment(-1.0), 0);
        assert_eq!(track.find_segment(0.0), 0);
        assert_eq!(track.find_segment(1.5), 1);
        assert_eq!(track.find_segment(3.0), 2);
        assert_eq!(track.find_segment(100.0), 2);
    }

    #[test]
    fn cursor_agrees_with_binary_search_on_jumps() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        for &t in &[0.2, 0.9, 1.1, 2.9, 0.1, 3.0, 2.5, 5.0, 0.0] {
            let a = track.sample_with_cursor(t, &mut cursor);
            assert!((a - track.sample(t)).abs() < 1e-5, "t={t}");
            assert_eq!(cursor.last_index, track.find_segment(t));
        }
    }
}
