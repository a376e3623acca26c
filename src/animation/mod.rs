//! Keyframe data and playback.
//!
//! - [`KeyframeTrack`] / [`Channel`]: raw per-bone keys and their sampling
//! - [`Animation`]: an immutable, shareable clip
//! - [`ActiveAnimation`]: one playing instance of a clip
//! - [`AnimationLayer`]: a chain of cursors cross-fading into each other

pub mod values;
pub mod tracks;
pub mod channel;
pub mod clip;
pub mod binder;
pub mod action;
pub mod layer;

pub use action::ActiveAnimation;
pub use binder::{Binder, ClipBinding};
pub use channel::{Channel, ChannelCursor};
pub use clip::{Animation, AnimationBuilder, BoneChannel};
pub use layer::{AnimationLayer, LayerId};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
