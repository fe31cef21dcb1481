//! Scene Tests
//!
//! Tests for:
//! - Transform: TRS matrix, look_at, matrix decomposition
//! - Pose: hierarchy world matrices, bind reset
//! - Camera: zoomed field of view, projection, view
//! - BoundingBox: fitting, transformed bounds

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use molview::assets::BoundingBox;
use molview::scene::{Camera, CameraConfig, Pose, SceneNode, Transform};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::default();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
    assert_eq!(t.local_matrix(), Affine3A::IDENTITY);
}

#[test]
fn transform_local_matrix_reflects_trs() {
    let mut t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
    t.scale = Vec3::splat(2.0);

    let p = t.local_matrix().transform_point3(Vec3::X);
    assert!(vec3_approx(p, Vec3::new(3.0, 2.0, 3.0)), "got {p}");
}

#[test]
fn transform_look_at_basic() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y);

    let mat = Mat4::from(t.local_matrix());
    let forward = -mat.z_axis.truncate().normalize();
    assert!(vec3_approx(forward, Vec3::new(0.0, 0.0, -1.0)));
}

#[test]
fn transform_look_at_collinear_up_noop() {
    let mut t = Transform::new();
    let original_rotation = t.rotation;
    // Target straight above with +Y up: no unique orientation.
    t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(t.rotation, original_rotation);
}

#[test]
fn transform_from_matrix_decomposition() {
    let original_pos = Vec3::new(5.0, -3.0, 7.0);
    let original_rot = Quat::from_rotation_x(0.7);
    let original_scale = Vec3::new(1.0, 2.0, 3.0);
    let mat = Mat4::from_scale_rotation_translation(original_scale, original_rot, original_pos);

    let t = Transform::from_matrix(mat);
    assert!(vec3_approx(t.position, original_pos));
    assert!(vec3_approx(t.scale, original_scale));
    assert!(t.rotation.angle_between(original_rot) < 1e-4);
}

// ============================================================================
// Pose hierarchy
// ============================================================================

#[test]
fn hierarchy_with_rotation_and_scale() {
    // Parent: translate (5,0,0), rotate 90° around Y, scale 2x
    let parent = SceneNode::new("parent")
        .with_transform(Transform {
            position: Vec3::new(5.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        })
        .with_children(vec![1]);
    let child = SceneNode::new("child").with_transform(Transform::from_translation(Vec3::X));
    let nodes = vec![parent, child];

    let mut pose = Pose::from_nodes(&nodes);
    pose.update_world_matrices(&nodes, &[0], Affine3A::IDENTITY);

    // (1,0,0) -> rotate 90° Y -> (0,0,-1) -> scale 2 -> (0,0,-2) -> translate -> (5,0,-2)
    let child_world: Vec3 = pose.world(1).unwrap().translation.into();
    assert!(vec3_approx(child_world, Vec3::new(5.0, 0.0, -2.0)), "got {child_world}");
}

#[test]
fn pose_reset_restores_bind_transforms() {
    let nodes = vec![SceneNode::new("a").with_transform(Transform::from_translation(Vec3::Y))];
    let mut pose = Pose::from_nodes(&nodes);

    pose.local_mut(0).unwrap().position = Vec3::splat(9.0);
    pose.reset_to_bind();
    assert_eq!(pose.local(0).unwrap().position, Vec3::Y);
}

#[test]
fn unreachable_nodes_are_not_visited() {
    let nodes = vec![
        SceneNode::new("root").with_transform(Transform::from_translation(Vec3::X)),
        SceneNode::new("orphan").with_transform(Transform::from_translation(Vec3::Y)),
    ];
    let mut pose = Pose::from_nodes(&nodes);
    pose.update_world_matrices(&nodes, &[0], Affine3A::IDENTITY);

    assert_eq!(pose.world(1), Some(&Affine3A::IDENTITY));
}

#[test]
fn cyclic_children_terminate() {
    let nodes = vec![
        SceneNode::new("a").with_children(vec![1]),
        SceneNode::new("b").with_children(vec![0]),
    ];
    let mut pose = Pose::from_nodes(&nodes);
    pose.update_world_matrices(&nodes, &[0], Affine3A::IDENTITY);
    assert_eq!(pose.len(), 2);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn zoom_narrows_field_of_view() {
    let mut camera = Camera::new_perspective(20.0, 1.0, 0.1, 1000.0);
    let base = camera.effective_fov();
    assert!(approx_eq(base, 20.0_f32.to_radians()));

    camera.zoom = 1.2;
    let zoomed = camera.effective_fov();
    let expected = 2.0 * ((10.0_f32.to_radians()).tan() / 1.2).atan();
    assert!(zoomed < base);
    assert!(approx_eq(zoomed, expected));
}

#[test]
fn configured_camera_looks_at_target() {
    let camera = Camera::from_config(&CameraConfig::default(), 16.0 / 9.0);

    // The target projects to the centre of the viewport.
    let clip = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(approx_eq(ndc.x, 0.0) && approx_eq(ndc.y, 0.0), "got {ndc}");
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn set_aspect_rejects_degenerate_values() {
    let mut camera = Camera::new_perspective(45.0, 2.0, 0.1, 100.0);
    let before = camera.projection_matrix();

    camera.set_aspect(0.0);
    camera.set_aspect(f32::NAN);
    assert_eq!(camera.projection_matrix(), before);

    camera.set_aspect(1.0);
    assert!(approx_eq(camera.aspect, 1.0));
    assert_ne!(camera.projection_matrix(), before);
}

// ============================================================================
// BoundingBox
// ============================================================================

#[test]
fn bounding_box_from_points() {
    let b = BoundingBox::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, -4.0, 0.0)]);
    assert_eq!(b.min, Vec3::new(-1.0, -4.0, 0.0));
    assert_eq!(b.max, Vec3::new(3.0, 0.0, 2.0));
    assert_eq!(b.center(), Vec3::new(1.0, -2.0, 1.0));
}

#[test]
fn empty_box_stays_empty() {
    let mut b = BoundingBox::EMPTY;
    assert!(b.is_empty());
    assert_eq!(b.radius(), 0.0);

    b.union(&BoundingBox::EMPTY);
    assert!(b.is_empty());
    assert!(b.transformed(&Affine3A::from_translation(Vec3::X)).is_empty());
}

#[test]
fn transformed_box_refits_axes() {
    let b = BoundingBox::from_points([Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0)]);
    let rotated = b.transformed(&Affine3A::from_rotation_y(FRAC_PI_2));

    assert!(vec3_approx(rotated.min, Vec3::new(0.0, 0.0, -2.0)), "got {}", rotated.min);
    assert!(vec3_approx(rotated.max, Vec3::new(1.0, 1.0, 0.0)), "got {}", rotated.max);
}
