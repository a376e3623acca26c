//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! [`ArmatureError`] only covers *configuration* failures: malformed keyframe
//! data, a skeleton whose bones are not in parent-before-child order, or a
//! lookup of a clip, bone or layer that was never registered. All of them are
//! raised while an armature is being built or a clip is being started, never
//! from the per-tick update path.
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_armature::errors::Result;
//!
//! fn setup(armature: &mut Armature) -> Result<()> {
//!     armature.play_animation(LayerId::BASE, "walk", true, 250.0)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for skeleton construction and playback setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmatureError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A bone references a parent that does not precede it in the bone list.
    #[error("Bone '{bone}' (index {index}) has parent index {parent}, which does not precede it")]
    InvalidHierarchy {
        /// Name of the offending bone
        bone: String,
        /// Index the bone would occupy
        index: usize,
        /// The invalid parent index
        parent: usize,
    },

    /// Two bones share the same name.
    #[error("Duplicate bone name: {0}")]
    DuplicateBone(String),

    /// No bone with this name exists on the armature.
    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    /// A bone index is out of range.
    #[error("Bone index out of range: {index} (bone count: {count})")]
    BoneIndexOutOfRange {
        /// The invalid index
        index: usize,
        /// Number of bones on the armature
        count: usize,
    },

    /// Bones cannot be added once the armature has been ticked.
    #[error("Armature '{0}' has already been updated; its bone list is frozen")]
    ArmatureFrozen(String),

    // ========================================================================
    // Clip & Track Errors
    // ========================================================================
    /// Keyframe data is malformed.
    #[error("Invalid keyframe track: {0}")]
    InvalidTrack(String),

    /// Clip-level data (duration, rate) is malformed.
    #[error("Invalid animation clip '{name}': {reason}")]
    InvalidClip {
        /// Clip name
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// A clip with this name is already registered on the armature.
    #[error("Duplicate animation clip: {0}")]
    DuplicateClip(String),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// The requested clip was never registered on this armature.
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    /// The requested layer does not exist.
    #[error("Animation layer not found: {0}")]
    LayerNotFound(String),

    /// A [`LayerId`](crate::animation::LayerId) that does not belong to this
    /// armature.
    #[error("Layer index out of range: {index} (layer count: {count})")]
    LayerIndexOutOfRange {
        /// The invalid index
        index: usize,
        /// Number of layers on the armature
        count: usize,
    },

    /// A layer with this name already exists.
    #[error("Duplicate animation layer: {0}")]
    DuplicateLayer(String),
}

/// Alias for `Result<T, ArmatureError>`.
pub type Result<T> = std::result::Result<T, ArmatureError>;
