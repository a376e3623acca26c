use crate::settings::AnimationSettings;

/// Accumulator that turns variable frame times into fixed simulation ticks.
///
/// ```rust,ignore
/// let mut clock = FixedTimestep::new(&settings);
/// loop {
///     for _ in 0..clock.advance(frame_dt) {
///         armature.update_animations(clock.tick_time());
///     }
///     draw(armature.bone_world_matrix_interpolated(0, clock.alpha()));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    rate: f64,
    step: f32,
    max_ticks_per_frame: u32,
    accumulator: f32,
    /// Index of the last tick handed out by `tick_time`
    tick_index: u64,
    pending: u32,
    /// Total number of fixed ticks run
    pub tick_count: u64,
}

impl FixedTimestep {
    /// A non-positive or non-finite `fixed_tick_rate` falls back to the
    /// default rate.
    #[must_use]
    pub fn new(settings: &AnimationSettings) -> Self {
        let mut rate = settings.fixed_tick_rate;
        if !rate.is_finite() || rate <= 0.0 {
            let fallback = AnimationSettings::default().fixed_tick_rate;
            log::warn!("Invalid fixed tick rate {rate}, using {fallback} Hz");
            rate = fallback;
        }

        Self {
            rate: f64::from(rate),
            step: 1.0 / rate,
            max_ticks_per_frame: settings.max_ticks_per_frame.max(1),
            accumulator: 0.0,
            tick_index: 0,
            pending: 0,
            tick_count: 0,
        }
    }

    /// Length of one tick in seconds.
    #[inline]
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feeds one rendered frame's duration and returns how many fixed ticks
    /// to run before drawing it.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if self.accumulator >= self.step {
            log::debug!(
                "Fixed timestep fell behind, dropping {:.3}s of simulation",
                self.accumulator - self.accumulator % self.step
            );
            self.accumulator %= self.step;
        }

        self.pending = ticks;
        self.tick_count += u64::from(ticks);
        ticks
    }

    /// Returns the run time of the next pending tick, advancing the clock.
    ///
    /// Call once per tick returned by [`advance`](Self::advance). The time is
    /// derived from the tick index, so it does not drift over long sessions.
    pub fn tick_time(&mut self) -> f32 {
        if self.pending > 0 {
            self.pending -= 1;
            self.tick_index += 1;
        }
        self.run_time()
    }

    /// Simulated time of the latest tick.
    #[must_use]
    pub fn run_time(&self) -> f32 {
        (self.tick_index as f64 / self.rate) as f32
    }

    /// Fraction of a tick elapsed since the latest one, for render
    /// interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }
}
