//! Utility Module
//!
//! - [`FixedTimestep`]: splits variable frame times into fixed simulation
//!   ticks and reports the interpolation factor for rendering

pub mod time;

pub use time::FixedTimestep;
