use common::retarget::{RetargetSession, TargetSkeleton};
use common::{
    MotionSample, MotionSource, ParallaxError, PoseChannel, PoseSample, RetargetConfig,
    SamplingThrottle,
};
use glam::{Quat, Vec3};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn source(frames: &[u32]) -> MotionSource {
    MotionSource::new(
        frames
            .iter()
            .map(|&frame| MotionSample {
                bone: "センター".to_string(),
                frame,
                position: Vec3::new(0.0, 10.0, 0.0),
                rotation: Quat::IDENTITY,
            })
            .collect(),
    )
}

#[test]
fn test_pose_channel_starts_neutral() {
    let channel = PoseChannel::new();
    assert_eq!(channel.latest(), PoseSample::NEUTRAL);
    assert!(!channel.has_sample());
}

#[test]
fn test_pose_channel_shares_across_threads() {
    let channel = PoseChannel::new();
    let writer = channel.clone();

    thread::spawn(move || {
        for i in 1..=100 {
            writer.publish(PoseSample::new(i as f32, -(i as f32), 1.0));
        }
    })
    .join()
    .unwrap();

    assert_eq!(channel.sequence(), 100);
    let latest = channel.latest();
    assert_eq!(latest.x, 100.0);
    assert_eq!(latest.y, -100.0);
}

#[test]
fn test_throttle_gates_by_interval() {
    let mut throttle = SamplingThrottle::new(Duration::from_millis(33));
    let start = Instant::now();

    assert!(throttle.try_acquire(start));
    assert!(!throttle.try_acquire(start + Duration::from_millis(10)));
    assert_eq!(
        throttle.remaining(start + Duration::from_millis(10)),
        Duration::from_millis(23)
    );
    assert!(throttle.try_acquire(start + Duration::from_millis(33)));
    assert!(!throttle.try_acquire(start + Duration::from_millis(40)));
}

#[test]
fn test_session_requires_skeleton() {
    let session = RetargetSession::new(RetargetConfig::default());
    let err = session.load_source(source(&[0, 30])).unwrap_err();
    assert!(matches!(err, ParallaxError::MissingTarget(_)));
    assert!(session.clip().is_none());
    assert!(!session.has_source());
}

#[test]
fn test_session_keeps_clip_on_failure() {
    let session = RetargetSession::new(RetargetConfig::default());
    session
        .load_skeleton(TargetSkeleton::full_humanoid("avatar"))
        .unwrap();
    let first = session.load_source(source(&[0, 30])).unwrap();

    let mut broken = source(&[0]);
    broken.frame_rate = f32::NAN;
    assert!(session.load_source(broken).is_err());

    let current = session.clip().unwrap();
    assert!(Arc::ptr_eq(&first, &current));
    assert!(!session.is_busy());
}

#[test]
fn test_session_config_change_reruns() {
    let session = RetargetSession::new(RetargetConfig::default());
    session
        .load_skeleton(TargetSkeleton::full_humanoid("avatar"))
        .unwrap();
    session.load_source(source(&[0])).unwrap();

    let config = RetargetConfig {
        hip_scale: 0.5,
        ..RetargetConfig::default()
    };
    let clip = session.set_config(config.clone()).unwrap().unwrap();
    let y = clip.tracks[0].keyframes[0].translation.unwrap().y;
    assert!((y - 5.0).abs() < 1e-5);
    assert_eq!(session.config(), config);
}

#[test]
fn test_session_rejects_invalid_config() {
    let session = RetargetSession::new(RetargetConfig::default());
    let bad = RetargetConfig {
        playback_speed: 0.0,
        ..RetargetConfig::default()
    };
    assert!(session.set_config(bad).is_err());
    assert_eq!(session.config(), RetargetConfig::default());
}

#[test]
fn test_session_new_skeleton_retargets_cached_source() {
    let session = RetargetSession::new(RetargetConfig::default());
    session
        .load_skeleton(TargetSkeleton::full_humanoid("first"))
        .unwrap();
    session.load_source(source(&[0, 60])).unwrap();

    let clip = session
        .load_skeleton(TargetSkeleton::full_humanoid("second"))
        .unwrap()
        .unwrap();
    assert_eq!(clip.name, "second_retargeted");
    assert!((clip.duration - 2.0).abs() < 1e-6);
}
