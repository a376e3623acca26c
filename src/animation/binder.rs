use crate::animation::clip::Animation;
use crate::armature::ArmatureBone;

/// Resolved mapping from an armature's bone indices to a clip's channels.
///
/// Name lookups happen once when playback starts; the per-tick path only
/// indexes. `None` means the clip does not drive that bone, either because it
/// has no channel for it or because the clip masks it out.
#[derive(Debug, Clone, Default)]
pub struct ClipBinding {
    channels: Vec<Option<usize>>,
}

impl ClipBinding {
    #[inline]
    #[must_use]
    pub fn channel_for(&self, bone_index: usize) -> Option<usize> {
        self.channels.get(bone_index).copied().flatten()
    }

    /// Number of bones this binding drives.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }
}

pub struct Binder;

impl Binder {
    /// Binds every channel of `clip` to the bone with the same name.
    pub fn bind(bones: &[ArmatureBone], clip: &Animation) -> ClipBinding {
        let channels = bones
            .iter()
            .map(|bone| clip.channel_index(bone.name()))
            .collect();

        ClipBinding { channels }
    }

    /// Names of the clip's channels that match no bone on the armature.
    pub fn unmatched_channels<'a>(bones: &[ArmatureBone], clip: &'a Animation) -> Vec<&'a str> {
        clip.channels()
            .iter()
            .map(|c| c.bone_name.as_str())
            .filter(|name| !bones.iter().any(|bone| bone.name() == *name))
            .collect()
    }
}
