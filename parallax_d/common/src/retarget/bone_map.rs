use api::HumanoidBone;

/// When two source names land on the same bone, the primary one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MappingPriority {
    Fallback,
    Primary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneMapping {
    pub source: &'static str,
    pub target: HumanoidBone,
    pub priority: MappingPriority,
}

const fn primary(source: &'static str, target: HumanoidBone) -> BoneMapping {
    BoneMapping {
        source,
        target,
        priority: MappingPriority::Primary,
    }
}

// Source skeleton naming (MMD standard bones)
pub const BONE_TABLE: &[BoneMapping] = &[
    BoneMapping {
        source: "全ての親",
        target: HumanoidBone::Hips,
        priority: MappingPriority::Fallback,
    },
    primary("センター", HumanoidBone::Hips),
    primary("上半身", HumanoidBone::Spine),
    primary("上半身2", HumanoidBone::Chest),
    primary("首", HumanoidBone::Neck),
    primary("頭", HumanoidBone::Head),
    primary("左肩", HumanoidBone::LeftShoulder),
    primary("左腕", HumanoidBone::LeftUpperArm),
    primary("左ひじ", HumanoidBone::LeftLowerArm),
    primary("左手首", HumanoidBone::LeftHand),
    primary("右肩", HumanoidBone::RightShoulder),
    primary("右腕", HumanoidBone::RightUpperArm),
    primary("右ひじ", HumanoidBone::RightLowerArm),
    primary("右手首", HumanoidBone::RightHand),
    primary("左足", HumanoidBone::LeftUpperLeg),
    primary("左ひざ", HumanoidBone::LeftLowerLeg),
    primary("左足首", HumanoidBone::LeftFoot),
    primary("右足", HumanoidBone::RightUpperLeg),
    primary("右ひざ", HumanoidBone::RightLowerLeg),
    primary("右足首", HumanoidBone::RightFoot),
];

pub fn lookup(source: &str) -> Option<&'static BoneMapping> {
    BONE_TABLE.iter().find(|m| m.source == source)
}
