//! External objects parented to bones.
//!
//! A bone never stores a reference to the object that follows it. Instead the
//! object is registered here and receives an [`AttachmentKey`]; every lookup
//! through that key is validated, so a stale key simply resolves to `None`.
//! The registered callback fires once when the attachment ends, either through
//! an explicit detach or because the owning armature was dropped.

use std::fmt;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct AttachmentKey;
}

/// Why an attachment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReason {
    /// [`Armature::detach`](super::Armature::detach) was called.
    Detached,
    /// The armature owning the bone was dropped.
    ArmatureDropped,
}

/// Called exactly once when an attachment ends.
pub type DetachCallback = Box<dyn FnMut(AttachmentKey, DetachReason) + Send>;

struct Attachment {
    bone: usize,
    on_detach: Option<DetachCallback>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("bone", &self.bone)
            .field("has_callback", &self.on_detach.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct AttachmentRegistry {
    slots: SlotMap<AttachmentKey, Attachment>,
}

impl AttachmentRegistry {
    pub(crate) fn insert(&mut self, bone: usize, on_detach: Option<DetachCallback>) -> AttachmentKey {
        self.slots.insert(Attachment { bone, on_detach })
    }

    /// Removes the attachment and notifies its owner. Returns the bone it was
    /// parented to, or `None` for a stale key.
    pub(crate) fn remove(&mut self, key: AttachmentKey, reason: DetachReason) -> Option<usize> {
        let mut attachment = self.slots.remove(key)?;
        if let Some(callback) = attachment.on_detach.as_mut() {
            callback(key, reason);
        }
        Some(attachment.bone)
    }

    pub(crate) fn bone_of(&self, key: AttachmentKey) -> Option<usize> {
        self.slots.get(key).map(|a| a.bone)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn notify_all(&mut self, reason: DetachReason) {
        for (key, mut attachment) in self.slots.drain() {
            if let Some(callback) = attachment.on_detach.as_mut() {
                callback(key, reason);
            }
        }
    }
}

impl Drop for AttachmentRegistry {
    fn drop(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        log::debug!("Notifying {} attachment(s) of armature drop", self.slots.len());
        self.notify_all(DetachReason::ArmatureDropped);
    }
}
