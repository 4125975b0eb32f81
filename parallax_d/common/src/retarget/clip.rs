use api::HumanoidBone;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds from clip start.
    pub time: f32,
    pub rotation: Quat,
    /// Only present on the root track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec3>,
}

/// Keyframes for one target bone, in non-decreasing time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetargetedTrack {
    pub bone: HumanoidBone,
    pub source_name: String,
    pub keyframes: Vec<Keyframe>,
}

impl RetargetedTrack {
    pub fn has_translation(&self) -> bool {
        self.keyframes.iter().any(|k| k.translation.is_some())
    }

    /// Pose at clip time `t`. Holds the first key before the start and the
    /// last key past the end.
    pub fn sample(&self, t: f32) -> Option<(Quat, Option<Vec3>)> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if t <= first.time {
            return Some((first.rotation, first.translation));
        }
        if t >= last.time {
            return Some((last.rotation, last.translation));
        }

        let next = self.keyframes.partition_point(|k| k.time <= t);
        let a = &self.keyframes[next - 1];
        let b = &self.keyframes[next];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return Some((b.rotation, b.translation));
        }
        let s = (t - a.time) / span;

        let rotation = a.rotation.slerp(b.rotation, s);
        let translation = match (a.translation, b.translation) {
            (Some(ta), Some(tb)) => Some(ta.lerp(tb, s)),
            (ta, tb) => tb.or(ta),
        };
        Some((rotation, translation))
    }
}

/// Counters for channels that did not become tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetargetDiagnostics {
    pub matched: usize,
    pub unmapped: usize,
    pub missing_on_skeleton: usize,
    pub superseded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetargetedClip {
    pub name: String,
    /// Latest sample time across every source channel, including ones that did
    /// not become tracks. Shorter tracks hold their last pose.
    pub duration: f32,
    pub tracks: Vec<RetargetedTrack>,
    pub looping: bool,
    pub playback_speed: f32,
    pub diagnostics: RetargetDiagnostics,
}

impl RetargetedClip {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, bone: HumanoidBone) -> Option<&RetargetedTrack> {
        self.tracks.iter().find(|t| t.bone == bone)
    }

    /// Maps elapsed playback time to clip time. Looping wraps to zero,
    /// otherwise the final pose is held.
    pub fn local_time(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let t = elapsed * self.playback_speed;
        if self.looping {
            t.rem_euclid(self.duration)
        } else {
            t.clamp(0.0, self.duration)
        }
    }
}
