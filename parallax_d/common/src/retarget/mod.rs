//! Foreign motion to humanoid keyframe tracks.
//!
//! Per-sample conversion order matters and is fixed: axis permutation,
//! scale, hip height, handedness flip, mirroring, rotation inverts, global
//! rotation offset, arm-pose correction.

mod axis;
pub mod bone_map;
mod clip;
mod config;
mod session;

pub use axis::AxisPermutation;
pub use bone_map::{BoneMapping, MappingPriority, BONE_TABLE};
pub use clip::{Keyframe, RetargetDiagnostics, RetargetedClip, RetargetedTrack};
pub use config::RetargetConfig;
pub use session::RetargetSession;

use api::{HumanoidBone, MotionSample, MotionSource};
use glam::{Quat, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ParallaxError;

/// Angles within this many degrees of zero are treated as no offset.
pub const ANGLE_EPSILON_DEGREES: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSample {
    pub frame: u32,
    pub position: Vec3,
    pub rotation: Quat,
}

/// All samples of one source bone.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionChannel {
    pub name: String,
    pub samples: Vec<ChannelSample>,
}

impl MotionChannel {
    /// Stable: samples sharing a frame keep their arrival order.
    pub fn sort_by_frame(&mut self) {
        self.samples.sort_by_key(|s| s.frame);
    }
}

/// Buckets samples by bone name. Channels come out in order of first appearance.
pub fn group_channels(samples: &[MotionSample]) -> Vec<MotionChannel> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut channels: Vec<MotionChannel> = Vec::new();

    for sample in samples {
        let slot = *index.entry(sample.bone.as_str()).or_insert_with(|| {
            channels.push(MotionChannel {
                name: sample.bone.clone(),
                samples: Vec::new(),
            });
            channels.len() - 1
        });
        channels[slot].samples.push(ChannelSample {
            frame: sample.frame,
            position: sample.position,
            rotation: sample.rotation,
        });
    }

    channels
}

pub fn validate_source(source: &MotionSource) -> Result<(), ParallaxError> {
    if !source.frame_rate.is_finite() || source.frame_rate <= 0.0 {
        return Err(ParallaxError::malformed(format!(
            "frame rate must be a finite value > 0, got {}",
            source.frame_rate
        )));
    }
    for sample in &source.samples {
        if !sample.position.is_finite() || !sample.rotation.is_finite() {
            return Err(ParallaxError::malformed(format!(
                "non-finite sample for bone '{}' at frame {}",
                sample.bone, sample.frame
            )));
        }
    }
    Ok(())
}

/// Reflects a position across the configured axes. Each mirrored axis also
/// flips the two rotation-vector components off that axis so the rotation
/// stays a proper rotation.
pub fn mirror(position: Vec3, rotation_vector: Vec3, config: &RetargetConfig) -> (Vec3, Vec3) {
    let mut p = position;
    let mut r = rotation_vector;
    if config.mirror_x {
        p.x = -p.x;
        r.y = -r.y;
        r.z = -r.z;
    }
    if config.mirror_y {
        p.y = -p.y;
        r.x = -r.x;
        r.z = -r.z;
    }
    if config.mirror_z {
        p.z = -p.z;
        r.x = -r.x;
        r.y = -r.y;
    }
    (p, r)
}

pub fn invert_rotation_vector(rotation_vector: Vec3, config: &RetargetConfig) -> Vec3 {
    let mut r = rotation_vector;
    if config.invert_x {
        r.x = -r.x;
    }
    if config.invert_y {
        r.y = -r.y;
    }
    if config.invert_z {
        r.z = -r.z;
    }
    r
}

/// Intrinsic X, then Y, then Z.
pub fn euler_xyz_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_rotation_x(x.to_radians())
        * Quat::from_rotation_y(y.to_radians())
        * Quat::from_rotation_z(z.to_radians())
}

/// Rotation offsets resolved once per invocation.
#[derive(Debug, Clone, Copy)]
struct Offsets {
    global: Option<Quat>,
    arm_pose: Option<Quat>,
}

impl Offsets {
    fn from_config(config: &RetargetConfig) -> Self {
        let angles = [
            config.rotation_offset_x_degrees,
            config.rotation_offset_y_degrees,
            config.rotation_offset_z_degrees,
        ];
        let global = angles
            .iter()
            .any(|a| a.abs() > ANGLE_EPSILON_DEGREES)
            .then(|| euler_xyz_degrees(angles[0], angles[1], angles[2]));

        let arm_pose = (config.arm_pose_offset_degrees.abs() > ANGLE_EPSILON_DEGREES).then(|| {
            Quat::from_axis_angle(Vec3::Z, config.arm_pose_offset_degrees.to_radians())
        });

        Self { global, arm_pose }
    }
}

fn convert_sample(
    bone: HumanoidBone,
    sample: &ChannelSample,
    config: &RetargetConfig,
    offsets: &Offsets,
) -> (Vec3, Quat) {
    let mut position = config.axis_map.apply(sample.position);
    let rotation_vector = config.axis_map.apply(sample.rotation.xyz());

    position *= config.hip_scale;
    if bone.is_root() {
        position.y += config.hip_height_offset;
    }
    // source is left-handed
    position.z = -position.z;

    let (position, rotation_vector) = mirror(position, rotation_vector, config);
    let v = invert_rotation_vector(rotation_vector, config);

    let mut rotation = Quat::from_xyzw(v.x, v.y, v.z, sample.rotation.w);
    if let Some(global) = offsets.global {
        rotation *= global;
    }
    if bone.is_arm_chain() {
        if let Some(arm_pose) = offsets.arm_pose {
            rotation *= arm_pose;
        }
    }

    (position, rotation)
}

/// Humanoid roles exposed by the loaded avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSkeleton {
    pub name: String,
    pub bones: Vec<HumanoidBone>,
}

impl TargetSkeleton {
    pub fn full_humanoid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bones: HumanoidBone::ALL.to_vec(),
        }
    }

    pub fn contains(&self, bone: HumanoidBone) -> bool {
        self.bones.contains(&bone)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MotionRetargeter {
    skeleton: Option<TargetSkeleton>,
}

impl MotionRetargeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skeleton(skeleton: TargetSkeleton) -> Self {
        Self {
            skeleton: Some(skeleton),
        }
    }

    pub fn skeleton(&self) -> Option<&TargetSkeleton> {
        self.skeleton.as_ref()
    }

    pub fn load_skeleton(&mut self, skeleton: TargetSkeleton) {
        info!(
            "Target skeleton '{}' loaded with {} humanoid bones",
            skeleton.name,
            skeleton.bones.len()
        );
        self.skeleton = Some(skeleton);
    }

    /// Builds the full track set. Nothing is returned on failure.
    pub fn retarget(
        &self,
        source: &MotionSource,
        config: &RetargetConfig,
    ) -> Result<RetargetedClip, ParallaxError> {
        let skeleton = self
            .skeleton
            .as_ref()
            .ok_or_else(|| ParallaxError::MissingTarget("no target skeleton loaded".into()))?;
        validate_source(source)?;
        config.validate()?;

        let rate = source.frame_rate;
        let mut channels = group_channels(&source.samples);
        for channel in &mut channels {
            channel.sort_by_frame();
        }
        // every channel counts toward the loop length, mapped or not
        let duration = channels
            .iter()
            .filter_map(|c| c.samples.last())
            .map(|s| s.frame as f32 / rate)
            .fold(0.0f32, f32::max);

        let mut diagnostics = RetargetDiagnostics::default();
        let mut selected: Vec<(&'static BoneMapping, &MotionChannel)> = Vec::new();

        for channel in &channels {
            let Some(mapping) = bone_map::lookup(&channel.name) else {
                debug!("Skipping unmapped source bone '{}'", channel.name);
                diagnostics.unmapped += 1;
                continue;
            };
            if !skeleton.contains(mapping.target) {
                debug!(
                    "Skipping '{}': {} not present on '{}'",
                    channel.name,
                    mapping.target.name(),
                    skeleton.name
                );
                diagnostics.missing_on_skeleton += 1;
                continue;
            }
            match selected.iter_mut().find(|(m, _)| m.target == mapping.target) {
                Some(existing) => {
                    diagnostics.superseded += 1;
                    if mapping.priority > existing.0.priority {
                        *existing = (mapping, channel);
                    }
                }
                None => selected.push((mapping, channel)),
            }
        }

        let offsets = Offsets::from_config(config);

        let tracks: Vec<RetargetedTrack> = selected
            .iter()
            .map(|(mapping, channel)| {
                let bone = mapping.target;
                debug!(
                    "'{}' -> {} ({} keys)",
                    channel.name,
                    bone.name(),
                    channel.samples.len()
                );
                let keyframes = channel
                    .samples
                    .iter()
                    .map(|sample| {
                        let (position, rotation) = convert_sample(bone, sample, config, &offsets);
                        Keyframe {
                            time: sample.frame as f32 / rate,
                            rotation,
                            translation: bone.is_root().then_some(position),
                        }
                    })
                    .collect();
                RetargetedTrack {
                    bone,
                    source_name: channel.name.clone(),
                    keyframes,
                }
            })
            .collect();

        diagnostics.matched = tracks.len();

        info!(
            "Retargeted onto '{}': matched {} bones ({} unmapped, {} missing, {} superseded), duration {:.2}s",
            skeleton.name,
            diagnostics.matched,
            diagnostics.unmapped,
            diagnostics.missing_on_skeleton,
            diagnostics.superseded,
            duration
        );

        Ok(RetargetedClip {
            name: format!("{}_retargeted", skeleton.name),
            duration,
            tracks,
            looping: config.looping,
            playback_speed: config.playback_speed,
            diagnostics,
        })
    }
}
