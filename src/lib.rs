//! Skeletal pose blending.
//!
//! Turns a skeleton, a set of keyframed clips and a playback timeline into
//! per-bone world transforms for skinning, with cross-faded playback layers
//! and interpolation between fixed simulation ticks.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_armature::{Animation, Armature, BoneDesc, LayerId, Trs};
//!
//! let mut armature = Armature::new("hero");
//! let root = armature.add_bone(BoneDesc::new("root", None, Trs::IDENTITY))?;
//! armature.add_animation(Arc::new(walk_clip))?;
//! armature.play_animation(LayerId::BASE, "walk", true, 0.0)?;
//!
//! armature.update_animations(run_time);
//! let matrix = armature.bone_world_matrix_interpolated(root, alpha);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod armature;
pub mod errors;
pub mod settings;
pub mod utils;

pub use animation::{ActiveAnimation, Animation, AnimationLayer, Channel, KeyframeTrack, LayerId};
pub use armature::{Armature, ArmatureBone, AttachmentKey, BoneDesc, DetachReason, Trs};
pub use errors::{ArmatureError, Result};
pub use settings::AnimationSettings;
pub use utils::FixedTimestep;
