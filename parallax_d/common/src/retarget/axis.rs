use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Relabeling of source axes. No sign changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AxisPermutation {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl AxisPermutation {
    pub const ALL: [AxisPermutation; 6] = [
        Self::Xyz,
        Self::Xzy,
        Self::Yxz,
        Self::Yzx,
        Self::Zxy,
        Self::Zyx,
    ];

    pub fn apply(self, v: Vec3) -> Vec3 {
        match self {
            Self::Xyz => v,
            Self::Xzy => Vec3::new(v.x, v.z, v.y),
            Self::Yxz => Vec3::new(v.y, v.x, v.z),
            Self::Yzx => Vec3::new(v.y, v.z, v.x),
            Self::Zxy => Vec3::new(v.z, v.x, v.y),
            Self::Zyx => Vec3::new(v.z, v.y, v.x),
        }
    }

    /// The permutation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Yzx => Self::Zxy,
            Self::Zxy => Self::Yzx,
            // swaps and identity are their own inverse
            other => other,
        }
    }
}
