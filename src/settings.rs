//! Animation Settings
//!
//! Tunables shared by armatures and the fixed-tick driver.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_armature::{Armature, AnimationSettings};
//!
//! // Simulate at 30 Hz and allow up to four clips cross-fading per layer.
//! let settings = AnimationSettings {
//!     fixed_tick_rate: 30.0,
//!     max_chain_length: 4,
//!     ..Default::default()
//! };
//!
//! let armature = Armature::with_settings("hero", settings);
//! ```

/// Tick rate assumed for clips whose source did not specify one.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Configuration for pose evaluation and fixed-tick stepping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    /// Fixed simulation ticks per second. Must be positive and finite;
    /// [`FixedTimestep`](crate::utils::FixedTimestep) replaces anything else
    /// with the default.
    pub fixed_tick_rate: f32,

    /// Upper bound on fixed ticks run for a single rendered frame.
    ///
    /// After a long stall the driver drops the backlog beyond this many ticks
    /// instead of trying to catch up.
    pub max_ticks_per_frame: u32,

    /// Maximum number of cursors cross-fading on one layer. When a new clip
    /// would exceed it, the oldest cursor is discarded early.
    pub max_chain_length: usize,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            fixed_tick_rate: 60.0,
            max_ticks_per_frame: 8,
            max_chain_length: 8,
        }
    }
}
