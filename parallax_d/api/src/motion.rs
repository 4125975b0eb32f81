use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Source animation is sampled at this rate unless the parser says otherwise.
pub const DEFAULT_SOURCE_FRAME_RATE: f32 = 30.0;

/// One raw sample for one source bone, as delivered by the animation parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub bone: String,
    pub frame: u32,
    pub position: Vec3,
    /// Quaternion in `[x, y, z, w]` order.
    pub rotation: Quat,
}

/// A flat, unordered sample list plus the source frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSource {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    pub samples: Vec<MotionSample>,
}

fn default_frame_rate() -> f32 {
    DEFAULT_SOURCE_FRAME_RATE
}

impl MotionSource {
    pub fn new(samples: Vec<MotionSample>) -> Self {
        Self {
            frame_rate: DEFAULT_SOURCE_FRAME_RATE,
            samples,
        }
    }
}

/// Closed set of humanoid bone roles used as the retargeting vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(usize)]
pub enum HumanoidBone {
    // Torso
    Hips = 0,
    Spine,
    Chest,
    Neck,
    Head,

    // Left arm
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,

    // Right arm
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,

    // Left leg
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,

    // Right leg
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
}

impl HumanoidBone {
    pub const COUNT: usize = 19;

    pub const ALL: [HumanoidBone; Self::COUNT] = [
        Self::Hips,
        Self::Spine,
        Self::Chest,
        Self::Neck,
        Self::Head,
        Self::LeftShoulder,
        Self::LeftUpperArm,
        Self::LeftLowerArm,
        Self::LeftHand,
        Self::RightShoulder,
        Self::RightUpperArm,
        Self::RightLowerArm,
        Self::RightHand,
        Self::LeftUpperLeg,
        Self::LeftLowerLeg,
        Self::LeftFoot,
        Self::RightUpperLeg,
        Self::RightLowerLeg,
        Self::RightFoot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Hips => "hips",
            Self::Spine => "spine",
            Self::Chest => "chest",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::LeftShoulder => "leftShoulder",
            Self::LeftUpperArm => "leftUpperArm",
            Self::LeftLowerArm => "leftLowerArm",
            Self::LeftHand => "leftHand",
            Self::RightShoulder => "rightShoulder",
            Self::RightUpperArm => "rightUpperArm",
            Self::RightLowerArm => "rightLowerArm",
            Self::RightHand => "rightHand",
            Self::LeftUpperLeg => "leftUpperLeg",
            Self::LeftLowerLeg => "leftLowerLeg",
            Self::LeftFoot => "leftFoot",
            Self::RightUpperLeg => "rightUpperLeg",
            Self::RightLowerLeg => "rightLowerLeg",
            Self::RightFoot => "rightFoot",
        }
    }

    /// The root bone; the only one that carries translation.
    pub fn is_root(self) -> bool {
        self == Self::Hips
    }

    /// Shoulders, upper arms and lower arms. Hands are excluded.
    pub fn is_arm_chain(self) -> bool {
        matches!(
            self,
            Self::LeftShoulder
                | Self::LeftUpperArm
                | Self::LeftLowerArm
                | Self::RightShoulder
                | Self::RightUpperArm
                | Self::RightLowerArm
        )
    }
}

impl TryFrom<usize> for HumanoidBone {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(value).copied().ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_discriminants() {
        for (i, bone) in HumanoidBone::ALL.iter().enumerate() {
            assert_eq!(*bone as usize, i);
            assert_eq!(HumanoidBone::try_from(i), Ok(*bone));
        }
        assert!(HumanoidBone::try_from(HumanoidBone::COUNT).is_err());
    }

    #[test]
    fn test_name_matches_wire_form() {
        for bone in HumanoidBone::ALL {
            let wire = serde_json::to_string(&bone).unwrap();
            assert_eq!(wire, format!("\"{}\"", bone.name()));
        }
    }

    #[test]
    fn test_arm_chain_excludes_hands() {
        assert!(HumanoidBone::LeftShoulder.is_arm_chain());
        assert!(HumanoidBone::RightLowerArm.is_arm_chain());
        assert!(!HumanoidBone::LeftHand.is_arm_chain());
        assert!(!HumanoidBone::Head.is_arm_chain());
    }

    #[test]
    fn test_motion_source_defaults_frame_rate() {
        let json = r#"{ "samples": [ { "bone": "head", "frame": 3, "position": [0, 0, 0], "rotation": [0, 0, 0, 1] } ] }"#;
        let source: MotionSource = serde_json::from_str(json).unwrap();
        assert_eq!(source.frame_rate, DEFAULT_SOURCE_FRAME_RATE);
        assert_eq!(source.samples[0].frame, 3);
        assert_eq!(source.samples[0].rotation, Quat::IDENTITY);
    }
}
