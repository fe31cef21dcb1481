//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation
//! - KeyframeCursor sequential access and binary search fallback
//! - AnimationAction loop modes, clamping, reset
//! - AnimationMixer binding, scheduling and pose application

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use molview::animation::{
    ActionEvent, AnimationAction, AnimationClip, AnimationMixer, Binder, InterpolationMode,
    Interpolatable, KeyframeCursor, KeyframeTrack, LoopMode, TargetPath, Track, TrackData,
    TrackMeta,
};
use molview::scene::{Pose, SceneNode, Transform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ============================================================================
// KeyframeTrack: Linear / Step
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_f32_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![3.0_f32, 7.0], InterpolationMode::Linear);

    assert!(approx(track.sample(0.0).unwrap(), 3.0));
    assert!(approx(track.sample(5.0).unwrap(), 7.0));
}

#[test]
fn track_step_holds_value() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![1.0_f32, 5.0, 9.0],
        InterpolationMode::Step,
    );

    assert!(approx(track.sample(0.99).unwrap(), 1.0));
    assert!(approx(track.sample(1.0).unwrap(), 5.0));
    assert!(approx(track.sample(1.5).unwrap(), 5.0));
}

#[test]
fn track_linear_vec3() {
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)],
        InterpolationMode::Linear,
    );

    let val = track.sample(1.0).unwrap();
    assert!(approx_vec3(val, Vec3::new(1.0, 2.0, 3.0)), "got {val}");
}

#[test]
fn track_linear_quat_slerp() {
    let end = Quat::from_rotation_y(FRAC_PI_2);
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, end],
        InterpolationMode::Linear,
    );

    let val = track.sample(0.5).unwrap();
    let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
    assert!(val.angle_between(expected) < 1e-4, "got {val}");
}

#[test]
fn empty_track_samples_nothing() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();

    assert!(track.is_empty());
    assert!(track.sample(0.0).is_none());
    assert!(track.sample_with_cursor(0.0, &mut cursor).is_none());
}

// ============================================================================
// KeyframeTrack: Cubic Spline
// ============================================================================

#[test]
fn track_cubic_f32_endpoints() {
    // (in_tangent, value, out_tangent) per key
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 1.0, 1.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    assert!(approx(track.sample(0.0).unwrap(), 0.0));
    assert!(approx(track.sample(1.0).unwrap(), 10.0));
}

#[test]
fn track_cubic_zero_tangents_is_smoothstep() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 0.0, 0.0, 1.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    assert!(approx(track.sample(0.5).unwrap(), 0.5));
    // smoothstep(0.25) = 3t² - 2t³
    assert!(approx(track.sample(0.25).unwrap(), 0.156_25));
}

// ============================================================================
// KeyframeCursor
// ============================================================================

#[test]
fn cursor_sequential_forward() {
    let times: Vec<f32> = (0..10).map(|i| i as f32).collect();
    let values: Vec<f32> = (0..10).map(|i| i as f32 * 2.0).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let mut t = 0.0;
    while t < 9.0 {
        let val = track.sample_with_cursor(t, &mut cursor).unwrap();
        assert!(approx(val, t * 2.0), "t={t}: expected {}, got {val}", t * 2.0);
        t += 0.25;
    }
    assert_eq!(cursor.last_index, 8);
}

#[test]
fn cursor_forward_then_jump_back() {
    let times: Vec<f32> = (0..20).map(|i| i as f32).collect();
    let values: Vec<f32> = (0..20).map(|i| i as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    track.sample_with_cursor(15.5, &mut cursor);
    assert_eq!(cursor.last_index, 15);

    // A loop wrap jumps far back and must fall back to the binary search.
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 0.5));
    assert_eq!(cursor.last_index, 0);
}

#[test]
fn cursor_matches_stateless_sample() {
    let track = KeyframeTrack::new(
        vec![0.0, 0.3, 0.9, 1.4, 2.0],
        vec![0.0_f32, 4.0, -2.0, 1.0, 8.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    for i in 0..=40 {
        let t = i as f32 * 0.05;
        let a = track.sample_with_cursor(t, &mut cursor).unwrap();
        let b = track.sample(t).unwrap();
        assert!(approx(a, b), "t={t}: cursor {a} vs stateless {b}");
    }
}

#[test]
fn interpolatable_vec3_linear() {
    let v = Vec3::interpolate_linear(Vec3::ZERO, Vec3::splat(4.0), 0.25);
    assert!(approx_vec3(v, Vec3::ONE));
}

// ============================================================================
// AnimationAction
// ============================================================================

fn make_simple_clip(duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "test",
        vec![Track {
            meta: TrackMeta {
                node_name: "node".to_string(),
                node_index: Some(0),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![Vec3::ZERO, Vec3::X],
                InterpolationMode::Linear,
            )),
        }],
    ))
}

fn playing(clip: Arc<AnimationClip>, mode: LoopMode) -> AnimationAction {
    let mut action = AnimationAction::new(clip);
    action.set_loop(mode).play();
    action
}

#[test]
fn new_action_does_not_advance_until_played() {
    let mut action = AnimationAction::new(make_simple_clip(2.0));

    assert!(!action.is_scheduled());
    assert_eq!(action.update(0.5), None);
    assert!(approx(action.time, 0.0));
    assert!(approx(action.effective_weight(), 0.0));
}

#[test]
fn action_loop_mode_once_finishes() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::Once);

    assert_eq!(action.update(3.0), Some(ActionEvent::Finished));
    assert!(approx(action.time, 2.0), "Once: should clamp to duration, got {}", action.time);
    assert!(!action.enabled, "Once without clamp drops out of the blend");
}

#[test]
fn action_clamp_when_finished_holds_last_frame() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::Once);
    action.clamp_when_finished = true;

    action.update(3.0);
    assert!(action.paused, "clamped action pauses on its last frame");
    assert!(action.enabled);
    assert!(approx(action.effective_weight(), 1.0));
    assert!(!action.is_running());
}

#[test]
fn action_repeat_wraps() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::Repeat);

    assert_eq!(action.update(2.5), Some(ActionEvent::Looped));
    assert!(approx(action.time, 0.5), "Repeat: should wrap to 0.5, got {}", action.time);
    assert_eq!(action.loop_count(), 1);
    assert!(action.is_running(), "Repeat never finishes");
}

#[test]
fn action_repeat_ignores_clamp_when_finished() {
    let mut action = playing(make_simple_clip(1.0), LoopMode::Repeat);
    action.clamp_when_finished = true;

    for _ in 0..350 {
        action.update(0.01);
    }
    assert!(action.is_running());
    assert!(!action.paused);
    assert!(action.time >= 0.0 && action.time < 1.0, "got {}", action.time);
    assert_eq!(action.loop_count(), 3);
}

#[test]
fn action_repeat_reverse_playback_stays_in_range() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::Repeat);
    action.time_scale = -1.0;
    action.time = 0.5;

    action.update(1.0);
    assert!(approx(action.time, 1.5), "got {}", action.time);
}

#[test]
fn action_ping_pong_samples_backwards_on_odd_pass() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::PingPong);

    action.update(2.5);
    assert_eq!(action.loop_count(), 1);
    assert!(approx(action.sample_time(), 1.5), "got {}", action.sample_time());

    action.update(2.0);
    assert_eq!(action.loop_count(), 2);
    assert!(approx(action.sample_time(), 0.5), "got {}", action.sample_time());
}

#[test]
fn action_paused_no_update() {
    let mut action = playing(make_simple_clip(2.0), LoopMode::Repeat);
    action.paused = true;
    action.time = 0.5;

    action.update(1.0);
    assert!(approx(action.time, 0.5), "Paused action should not advance");
}

#[test]
fn action_time_scale() {
    let mut action = playing(make_simple_clip(4.0), LoopMode::Once);
    action.time_scale = 2.0;

    action.update(1.0);
    assert!(approx(action.time, 2.0), "Expected 2.0, got {}", action.time);
}

#[test]
fn reset_rewinds_and_clears_finish_state() {
    let mut action = playing(make_simple_clip(1.0), LoopMode::Once);
    action.clamp_when_finished = true;
    action.update(5.0);
    assert!(action.paused);

    action.reset();
    assert!(approx(action.time, 0.0));
    assert!(!action.paused);
    assert!(action.enabled);
    assert_eq!(action.loop_count(), 0);
    assert!(action.is_scheduled(), "reset keeps scheduling");
}

#[test]
fn stop_unschedules_and_rewinds() {
    let mut action = playing(make_simple_clip(1.0), LoopMode::Repeat);
    action.update(0.4);

    action.stop();
    assert!(!action.is_scheduled());
    assert!(approx(action.time, 0.0));
}

// ============================================================================
// AnimationClip Auto-Duration
// ============================================================================

#[test]
fn clip_auto_duration() {
    let clip = AnimationClip::new(
        "test",
        vec![
            Track {
                meta: TrackMeta {
                    node_name: "a".to_string(),
                    node_index: None,
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, 1.5],
                    vec![Vec3::ZERO, Vec3::X],
                    InterpolationMode::Linear,
                )),
            },
            Track {
                meta: TrackMeta {
                    node_name: "b".to_string(),
                    node_index: None,
                    target: TargetPath::Rotation,
                },
                data: TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 3.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_y(1.0)],
                    InterpolationMode::Linear,
                )),
            },
        ],
    );

    assert!(
        approx(clip.duration, 3.0),
        "Duration should be max of all tracks (3.0), got {}",
        clip.duration
    );
}

#[test]
fn clip_empty_tracks_zero_duration() {
    let clip = AnimationClip::new("empty", vec![]);
    assert!(approx(clip.duration, 0.0));
}

// ============================================================================
// Binder
// ============================================================================

#[test]
fn binder_prefers_index_then_falls_back_to_name() {
    let nodes = vec![SceneNode::new("root"), SceneNode::new("node")];
    // Recorded index 0 names "root", not "node": resolve by name instead.
    let clip = make_simple_clip(1.0);

    let bindings = Binder::bind(&nodes, &clip);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].node_index, 1);
    assert_eq!(bindings[0].target, TargetPath::Translation);
}

#[test]
fn binder_drops_unresolved_tracks() {
    let nodes = vec![SceneNode::new("other")];
    let bindings = Binder::bind(&nodes, &make_simple_clip(1.0));
    assert!(bindings.is_empty());
}

// ============================================================================
// AnimationMixer
// ============================================================================

fn node_scene() -> Vec<SceneNode> {
    vec![SceneNode::new("node").with_transform(Transform::from_translation(Vec3::new(0.0, 5.0, 0.0)))]
}

#[test]
fn clip_action_is_memoised_per_clip() {
    let nodes = node_scene();
    let clip = make_simple_clip(1.0);
    let mut mixer = AnimationMixer::new();

    let a = mixer.clip_action(&clip, &nodes);
    let b = mixer.clip_action(&clip, &nodes);
    let c = mixer.clip_action(&make_simple_clip(1.0), &nodes);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(mixer.actions().len(), 2);
}

#[test]
fn mixer_apply_writes_sampled_translation() {
    let nodes = node_scene();
    let clip = make_simple_clip(2.0);
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &nodes);
    mixer.action_mut(handle).unwrap().play();

    let mut pose = Pose::from_nodes(&nodes);
    mixer.update(1.0);
    mixer.apply(&mut pose);

    let local = pose.local(0).unwrap();
    assert!(approx_vec3(local.position, Vec3::new(0.5, 0.0, 0.0)), "got {}", local.position);
    assert!(approx(mixer.time(), 1.0));
}

#[test]
fn mixer_unscheduled_action_leaves_bind_pose() {
    let nodes = node_scene();
    let mut mixer = AnimationMixer::new();
    mixer.clip_action(&make_simple_clip(2.0), &nodes);

    let mut pose = Pose::from_nodes(&nodes);
    mixer.update(1.0);
    mixer.apply(&mut pose);

    assert!(approx_vec3(pose.local(0).unwrap().position, Vec3::new(0.0, 5.0, 0.0)));
}

#[test]
fn mixer_stop_all_restores_bind_pose() {
    let nodes = node_scene();
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&make_simple_clip(2.0), &nodes);
    mixer.action_mut(handle).unwrap().play();

    let mut pose = Pose::from_nodes(&nodes);
    mixer.update(1.0);
    mixer.apply(&mut pose);
    mixer.stop_all_action();
    mixer.apply(&mut pose);

    assert!(approx_vec3(pose.local(0).unwrap().position, Vec3::new(0.0, 5.0, 0.0)));
    assert!(mixer.actions().iter().all(|a| !a.is_scheduled()));
}

#[test]
fn mixer_time_scale_scales_every_action() {
    let nodes = node_scene();
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&make_simple_clip(10.0), &nodes);
    mixer.action_mut(handle).unwrap().play();
    mixer.time_scale = 0.5;

    mixer.update(2.0);
    assert!(approx(mixer.action(handle).unwrap().time, 1.0));
}

#[test]
fn pose_world_matrices_follow_hierarchy() {
    let nodes = vec![
        SceneNode::new("parent")
            .with_transform(Transform::from_translation(Vec3::X))
            .with_children(vec![1]),
        SceneNode::new("child").with_transform(Transform::from_translation(Vec3::Y)),
    ];
    let mut pose = Pose::from_nodes(&nodes);
    pose.update_world_matrices(&nodes, &[0], Affine3A::from_translation(Vec3::Z));

    let child = pose.world(1).unwrap().translation;
    assert!(approx_vec3(child.into(), Vec3::new(1.0, 1.0, 1.0)), "got {child}");
}
