use common::retarget::{
    euler_xyz_degrees, group_channels, mirror, AxisPermutation, MotionRetargeter,
    RetargetConfig, TargetSkeleton,
};
use common::{HumanoidBone, MotionSample, MotionSource, ParallaxError};
use glam::{Quat, Vec3};

fn sample(bone: &str, frame: u32, position: Vec3, rotation: Quat) -> MotionSample {
    MotionSample {
        bone: bone.to_string(),
        frame,
        position,
        rotation,
    }
}

fn still(bone: &str, frame: u32) -> MotionSample {
    sample(bone, frame, Vec3::ZERO, Quat::IDENTITY)
}

fn retargeter() -> MotionRetargeter {
    MotionRetargeter::with_skeleton(TargetSkeleton::full_humanoid("avatar"))
}

mod pipeline {
    use super::*;

    #[test]
    fn test_frame_index_to_seconds() {
        let source = MotionSource::new(vec![still("頭", 0), still("頭", 30)]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();

        let head = clip.track(HumanoidBone::Head).unwrap();
        assert_eq!(head.keyframes.len(), 2);
        assert!((head.keyframes[1].time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_config_on_root_sample() {
        let source = MotionSource::new(vec![sample(
            "センター",
            0,
            Vec3::new(10.0, 20.0, 30.0),
            Quat::from_xyzw(0.1, 0.2, 0.3, 0.9),
        )]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();

        let key = clip.track(HumanoidBone::Hips).unwrap().keyframes[0];
        // scale 0.1, z flip, mirror X and Z
        let translation = key.translation.unwrap();
        assert!(translation.abs_diff_eq(Vec3::new(-1.0, 2.0, 3.0), 1e-5));
        // mirror X: (x, -y, -z), mirror Z: (-x, y, -z), invert X and Y: (x, -y, -z)
        let expected = Quat::from_xyzw(0.1, -0.2, -0.3, 0.9);
        assert!(key.rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_axis_permutation_hits_position_and_rotation() {
        let config = RetargetConfig {
            axis_map: AxisPermutation::Zxy,
            ..RetargetConfig::passthrough()
        };
        let source = MotionSource::new(vec![sample(
            "センター",
            0,
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_xyzw(0.1, 0.2, 0.3, 0.5),
        )]);
        let clip = retargeter().retarget(&source, &config).unwrap();
        let key = clip.tracks[0].keyframes[0];

        // (z, x, y), then the handedness flip on the third component
        assert!(key
            .translation
            .unwrap()
            .abs_diff_eq(Vec3::new(3.0, 1.0, -2.0), 1e-6));
        assert!(key
            .rotation
            .abs_diff_eq(Quat::from_xyzw(0.3, 0.1, 0.2, 0.5), 1e-6));
    }

    #[test]
    fn test_only_root_carries_translation() {
        let source = MotionSource::new(vec![
            sample("センター", 0, Vec3::ONE, Quat::IDENTITY),
            sample("左足", 0, Vec3::ONE, Quat::IDENTITY),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();

        assert!(clip.track(HumanoidBone::Hips).unwrap().has_translation());
        assert!(!clip.track(HumanoidBone::LeftUpperLeg).unwrap().has_translation());
    }

    #[test]
    fn test_hip_height_offset_only_on_hips() {
        let config = RetargetConfig {
            hip_scale: 0.5,
            hip_height_offset: 1.0,
            ..RetargetConfig::passthrough()
        };
        let source = MotionSource::new(vec![sample(
            "センター",
            0,
            Vec3::new(0.0, 4.0, 0.0),
            Quat::IDENTITY,
        )]);
        let clip = retargeter().retarget(&source, &config).unwrap();
        let translation = clip.tracks[0].keyframes[0].translation.unwrap();
        assert!((translation.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_arm_pose_offset_skips_head_and_hands() {
        let config = RetargetConfig {
            rotation_offset_x_degrees: 10.0,
            arm_pose_offset_degrees: 30.0,
            ..RetargetConfig::passthrough()
        };
        let source = MotionSource::new(vec![
            still("頭", 0),
            still("左腕", 0),
            still("右肩", 0),
            still("左手首", 0),
        ]);
        let clip = retargeter().retarget(&source, &config).unwrap();

        let global = euler_xyz_degrees(10.0, 0.0, 0.0);
        let arm = global * Quat::from_axis_angle(Vec3::Z, 30f32.to_radians());

        let rot = |bone| clip.track(bone).unwrap().keyframes[0].rotation;
        assert!(rot(HumanoidBone::Head).abs_diff_eq(global, 1e-6));
        assert!(rot(HumanoidBone::LeftHand).abs_diff_eq(global, 1e-6));
        assert!(rot(HumanoidBone::LeftUpperArm).abs_diff_eq(arm, 1e-6));
        assert!(rot(HumanoidBone::RightShoulder).abs_diff_eq(arm, 1e-6));
    }

    #[test]
    fn test_global_offset_is_right_multiplied() {
        let config = RetargetConfig {
            rotation_offset_y_degrees: 90.0,
            ..RetargetConfig::passthrough()
        };
        let base = Quat::from_rotation_x(0.5);
        let source = MotionSource::new(vec![sample("首", 0, Vec3::ZERO, base)]);
        let clip = retargeter().retarget(&source, &config).unwrap();

        let expected = base * Quat::from_rotation_y(90f32.to_radians());
        assert!(clip.tracks[0].keyframes[0]
            .rotation
            .abs_diff_eq(expected, 1e-6));
    }
}

mod channels {
    use super::*;

    #[test]
    fn test_group_keeps_first_appearance_order() {
        let samples = vec![
            still("首", 3),
            still("センター", 0),
            still("首", 1),
            still("頭", 2),
        ];
        let channels = group_channels(&samples);
        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["首", "センター", "頭"]);
        assert_eq!(channels[0].samples.len(), 2);
    }

    #[test]
    fn test_sort_is_stable_for_duplicate_frames() {
        let q = |x: f32| Quat::from_xyzw(x, 0.0, 0.0, 1.0);
        let source = MotionSource::new(vec![
            sample("頭", 5, Vec3::ZERO, q(0.1)),
            sample("頭", 0, Vec3::ZERO, q(0.2)),
            sample("頭", 5, Vec3::ZERO, q(0.3)),
            sample("頭", 2, Vec3::ZERO, q(0.4)),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::passthrough())
            .unwrap();

        let keys = &clip.track(HumanoidBone::Head).unwrap().keyframes;
        let xs: Vec<f32> = keys.iter().map(|k| k.rotation.x).collect();
        assert_eq!(xs, vec![0.2, 0.4, 0.1, 0.3]);
        assert!(keys.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_tracks_follow_source_order() {
        let source = MotionSource::new(vec![still("右足", 0), still("上半身", 0), still("首", 0)]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        let bones: Vec<HumanoidBone> = clip.tracks.iter().map(|t| t.bone).collect();
        assert_eq!(
            bones,
            vec![
                HumanoidBone::RightUpperLeg,
                HumanoidBone::Spine,
                HumanoidBone::Neck
            ]
        );
    }
}

mod mapping {
    use super::*;

    #[test]
    fn test_unmapped_channels_are_counted_not_fatal() {
        let source = MotionSource::new(vec![still("頭", 0), still("左目", 0), still("スカート", 4)]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.diagnostics.matched, 1);
        assert_eq!(clip.diagnostics.unmapped, 2);
    }

    #[test]
    fn test_zero_matches_is_an_empty_clip() {
        let source = MotionSource::new(vec![still("左目", 10)]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        assert!(clip.is_empty());
        assert!((clip.duration - 10.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_center_wins_over_parent_for_hips() {
        let source = MotionSource::new(vec![
            sample("全ての親", 0, Vec3::X, Quat::IDENTITY),
            sample("センター", 0, Vec3::Y, Quat::IDENTITY),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::passthrough())
            .unwrap();

        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.tracks[0].source_name, "センター");
        assert_eq!(clip.diagnostics.superseded, 1);
    }

    #[test]
    fn test_parent_drives_hips_when_alone() {
        let source = MotionSource::new(vec![still("全ての親", 0)]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        assert_eq!(clip.tracks[0].bone, HumanoidBone::Hips);
    }

    #[test]
    fn test_bones_missing_on_skeleton_are_skipped() {
        let skeleton = TargetSkeleton {
            name: "no_chest".into(),
            bones: HumanoidBone::ALL
                .iter()
                .copied()
                .filter(|b| *b != HumanoidBone::Chest)
                .collect(),
        };
        let source = MotionSource::new(vec![still("上半身2", 0), still("上半身", 0)]);
        let clip = MotionRetargeter::with_skeleton(skeleton)
            .retarget(&source, &RetargetConfig::default())
            .unwrap();

        assert!(clip.track(HumanoidBone::Chest).is_none());
        assert!(clip.track(HumanoidBone::Spine).is_some());
        assert_eq!(clip.diagnostics.missing_on_skeleton, 1);
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_missing_skeleton() {
        let source = MotionSource::new(vec![still("頭", 0)]);
        let err = MotionRetargeter::new()
            .retarget(&source, &RetargetConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParallaxError::MissingTarget(_)));
    }

    #[test]
    fn test_bad_frame_rate() {
        let mut source = MotionSource::new(vec![still("頭", 0)]);
        source.frame_rate = 0.0;
        let err = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParallaxError::MalformedSource { .. }));
    }

    #[test]
    fn test_non_finite_sample() {
        let source = MotionSource::new(vec![
            still("頭", 0),
            sample("首", 1, Vec3::new(f32::NAN, 0.0, 0.0), Quat::IDENTITY),
        ]);
        let err = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParallaxError::MalformedSource { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let source = MotionSource::new(vec![still("頭", 0)]);
        let config = RetargetConfig {
            hip_scale: 0.0,
            ..RetargetConfig::default()
        };
        let err = retargeter().retarget(&source, &config).unwrap_err();
        assert!(matches!(
            err,
            ParallaxError::InvalidConfig {
                field: "hip_scale",
                ..
            }
        ));
    }
}

mod signs {
    use super::*;

    #[test]
    fn test_mirror_x_reference_case() {
        let config = RetargetConfig {
            mirror_x: true,
            ..RetargetConfig::passthrough()
        };
        let (p, r) = mirror(Vec3::new(2.0, 3.0, -4.0), Vec3::new(0.1, 0.2, 0.3), &config);
        assert_eq!(p, Vec3::new(-2.0, 3.0, -4.0));
        assert_eq!(r, Vec3::new(0.1, -0.2, -0.3));
    }

    #[test]
    fn test_mirror_applied_twice_restores_input() {
        let position = Vec3::new(2.0, 3.0, -4.0);
        let rotation = Vec3::new(0.1, 0.2, 0.3);
        for (x, y, z) in [(true, false, false), (false, true, false), (false, false, true)] {
            let config = RetargetConfig {
                mirror_x: x,
                mirror_y: y,
                mirror_z: z,
                ..RetargetConfig::passthrough()
            };
            let (p, r) = mirror(position, rotation, &config);
            let (p, r) = mirror(p, r, &config);
            assert_eq!(p, position);
            assert_eq!(r, rotation);
        }
    }

    #[test]
    fn test_mirror_all_axes_flips_each_rotation_component_twice() {
        let config = RetargetConfig {
            mirror_x: true,
            mirror_y: true,
            mirror_z: true,
            ..RetargetConfig::passthrough()
        };
        let (p, r) = mirror(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3), &config);
        assert_eq!(p, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(r, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_invert_cancels_matching_mirror_flip() {
        // mirror X flips y and z; invert Y flips y back
        let config = RetargetConfig {
            mirror_x: true,
            invert_y: true,
            ..RetargetConfig::passthrough()
        };
        let source = MotionSource::new(vec![sample(
            "頭",
            0,
            Vec3::ZERO,
            Quat::from_xyzw(0.1, 0.2, 0.3, 0.9),
        )]);
        let clip = retargeter().retarget(&source, &config).unwrap();
        let rotation = clip.tracks[0].keyframes[0].rotation;
        assert!(rotation.abs_diff_eq(Quat::from_xyzw(0.1, 0.2, -0.3, 0.9), 1e-6));
    }

    #[test]
    fn test_axis_inverse_restores_input() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        for axis in AxisPermutation::ALL {
            assert_eq!(axis.inverse().apply(axis.apply(v)), v, "{:?}", axis);
        }
    }
}

mod playback {
    use super::*;

    fn clip_with(looping: bool, speed: f32) -> common::RetargetedClip {
        let source = MotionSource::new(vec![
            still("頭", 0),
            still("頭", 90),
            still("首", 45),
        ]);
        let config = RetargetConfig {
            looping,
            playback_speed: speed,
            ..RetargetConfig::default()
        };
        retargeter().retarget(&source, &config).unwrap()
    }

    #[test]
    fn test_duration_is_latest_track_time() {
        let clip = clip_with(true, 1.0);
        assert!((clip.duration - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_unmapped_channel_extends_duration() {
        let source = MotionSource::new(vec![
            still("頭", 0),
            still("頭", 30),
            still("左人指１", 300),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        assert_eq!(clip.diagnostics.unmapped, 1);
        assert_eq!(clip.tracks.len(), 1);
        assert!((clip.duration - 10.0).abs() < 1e-6);
        // head track ends at 1s and holds until the clip loops
        assert!((clip.local_time(9.0) - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_skeleton_gaps_extend_duration() {
        let skeleton = TargetSkeleton {
            name: "bust".into(),
            bones: vec![HumanoidBone::Head],
        };
        let source = MotionSource::new(vec![still("頭", 0), still("首", 60)]);
        let clip = MotionRetargeter::with_skeleton(skeleton)
            .retarget(&source, &RetargetConfig::default())
            .unwrap();
        assert_eq!(clip.diagnostics.missing_on_skeleton, 1);
        assert!((clip.duration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_time_wraps_or_holds() {
        let looping = clip_with(true, 2.0);
        assert!((looping.local_time(2.0) - 1.0).abs() < 1e-5);

        let once = clip_with(false, 1.0);
        assert_eq!(once.local_time(10.0), 3.0);
        assert_eq!(once.local_time(-1.0), 0.0);
    }

    #[test]
    fn test_shorter_track_holds_last_pose() {
        let source = MotionSource::new(vec![
            still("頭", 0),
            still("頭", 90),
            sample("首", 0, Vec3::ZERO, Quat::IDENTITY),
            sample("首", 30, Vec3::ZERO, Quat::from_rotation_y(1.0)),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::passthrough())
            .unwrap();

        let neck = clip.track(HumanoidBone::Neck).unwrap();
        let (held, _) = neck.sample(2.5).unwrap();
        assert!(held.abs_diff_eq(Quat::from_rotation_y(1.0), 1e-6));

        let (mid, _) = neck.sample(0.5).unwrap();
        assert!(mid.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));
    }

    #[test]
    fn test_root_translation_interpolates() {
        let source = MotionSource::new(vec![
            sample("センター", 0, Vec3::ZERO, Quat::IDENTITY),
            sample("センター", 30, Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY),
        ]);
        let clip = retargeter()
            .retarget(&source, &RetargetConfig::passthrough())
            .unwrap();

        let (_, translation) = clip.tracks[0].sample(0.25).unwrap();
        assert!(translation
            .unwrap()
            .abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }
}
