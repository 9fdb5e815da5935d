use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::sync::Arc;

use glam::{Quat, Vec3};

use super::skeleton::{AnimationClip, BoneTrack, Channel, Interpolate, Skeleton, Transform};

/// The three clips the dancer switches between.
#[derive(Debug, Clone)]
pub struct ClipSet {
    pub idle: Arc<AnimationClip>,
    pub walk: Arc<AnimationClip>,
    pub dance: Arc<AnimationClip>,
}

impl ClipSet {
    /// Stick-figure rig used when no authored clips are available.
    pub fn procedural() -> Self {
        let skeleton = Arc::new(stick_figure());
        Self {
            idle: Arc::new(idle_clip(skeleton.clone())),
            walk: Arc::new(walk_clip(skeleton.clone())),
            dance: Arc::new(dance_clip(skeleton)),
        }
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.idle.skeleton
    }
}

const HIPS: usize = 0;
const SPINE: usize = 1;
const CHEST: usize = 2;
const HEAD: usize = 3;
const L_UPPER_ARM: usize = 4;
const L_FOREARM: usize = 5;
const R_UPPER_ARM: usize = 6;
const R_FOREARM: usize = 7;
const L_THIGH: usize = 8;
const L_SHIN: usize = 9;
const R_THIGH: usize = 10;
const R_SHIN: usize = 11;

fn stick_figure() -> Skeleton {
    let t = Transform::from_translation;
    Skeleton::from_rest_pose(vec![
        ("hips".into(), None, t(Vec3::new(0.0, 1.0, 0.0))),
        ("spine".into(), Some(HIPS), t(Vec3::new(0.0, 0.25, 0.0))),
        ("chest".into(), Some(SPINE), t(Vec3::new(0.0, 0.3, 0.0))),
        ("head".into(), Some(CHEST), t(Vec3::new(0.0, 0.3, 0.0))),
        ("upper_arm.l".into(), Some(CHEST), t(Vec3::new(0.25, 0.0, 0.0))),
        ("forearm.l".into(), Some(L_UPPER_ARM), t(Vec3::new(0.0, -0.3, 0.0))),
        ("upper_arm.r".into(), Some(CHEST), t(Vec3::new(-0.25, 0.0, 0.0))),
        ("forearm.r".into(), Some(R_UPPER_ARM), t(Vec3::new(0.0, -0.3, 0.0))),
        ("thigh.l".into(), Some(HIPS), t(Vec3::new(0.12, -0.05, 0.0))),
        ("shin.l".into(), Some(L_THIGH), t(Vec3::new(0.0, -0.45, 0.0))),
        ("thigh.r".into(), Some(HIPS), t(Vec3::new(-0.12, -0.05, 0.0))),
        ("shin.r".into(), Some(R_THIGH), t(Vec3::new(0.0, -0.45, 0.0))),
    ])
}

/// Samples `f` at `keys + 1` evenly spaced times over `duration`, closing the loop.
fn sampled<T, F>(duration: f32, keys: usize, f: F) -> Channel<T>
where
    T: Interpolate,
    F: Fn(f32) -> T,
{
    let times: Vec<f32> = (0..=keys)
        .map(|k| duration * k as f32 / keys as f32)
        .collect();
    let values = times.iter().map(|&t| f(t / duration * TAU)).collect();
    Channel::new(times, values)
}

fn swing(duration: f32, axis: Vec3, amplitude: f32, phase: f32) -> BoneTrack {
    BoneTrack {
        rotation: Some(sampled(duration, 8, |a| {
            Quat::from_axis_angle(axis, amplitude * (a + phase).sin())
        })),
        ..BoneTrack::default()
    }
}

fn tracks(skeleton: &Skeleton, entries: Vec<(usize, BoneTrack)>) -> Vec<Option<BoneTrack>> {
    let mut tracks = vec![None; skeleton.len()];
    for (joint, track) in entries {
        tracks[joint] = Some(track);
    }
    tracks
}

fn idle_clip(skeleton: Arc<Skeleton>) -> AnimationClip {
    let duration = 2.0;
    let rest_hips = skeleton.joints()[HIPS].rest.translation;
    let breathe = BoneTrack {
        translation: Some(sampled(duration, 4, |a| rest_hips + Vec3::Y * 0.02 * a.sin())),
        ..BoneTrack::default()
    };
    let entries = vec![
        (HIPS, breathe),
        (SPINE, swing(duration, Vec3::Z, 0.03, 0.0)),
        (HEAD, swing(duration, Vec3::Y, 0.1, FRAC_PI_2)),
        (L_UPPER_ARM, swing(duration, Vec3::Z, 0.05, 0.0)),
        (R_UPPER_ARM, swing(duration, Vec3::Z, -0.05, 0.0)),
    ];
    AnimationClip::new("idle", skeleton.clone(), tracks(&skeleton, entries), Some(duration))
}

fn walk_clip(skeleton: Arc<Skeleton>) -> AnimationClip {
    let duration = 1.0;
    let stride = FRAC_PI_4 * 0.75;
    let rest_hips = skeleton.joints()[HIPS].rest.translation;
    let bob = BoneTrack {
        translation: Some(sampled(duration, 8, |a| {
            rest_hips + Vec3::Y * 0.04 * (2.0 * a).cos()
        })),
        ..BoneTrack::default()
    };
    let knee = |phase: f32| BoneTrack {
        rotation: Some(sampled(duration, 8, move |a| {
            Quat::from_rotation_x(0.4 * (0.5 + 0.5 * (a + phase).sin()))
        })),
        ..BoneTrack::default()
    };
    let entries = vec![
        (HIPS, bob),
        (L_THIGH, swing(duration, Vec3::X, stride, 0.0)),
        (R_THIGH, swing(duration, Vec3::X, stride, TAU / 2.0)),
        (L_SHIN, knee(0.0)),
        (R_SHIN, knee(TAU / 2.0)),
        (L_UPPER_ARM, swing(duration, Vec3::X, stride * 0.8, TAU / 2.0)),
        (R_UPPER_ARM, swing(duration, Vec3::X, stride * 0.8, 0.0)),
    ];
    AnimationClip::new("walk", skeleton.clone(), tracks(&skeleton, entries), Some(duration))
}

fn dance_clip(skeleton: Arc<Skeleton>) -> AnimationClip {
    let duration = 4.0;
    let raised = |side: f32| BoneTrack {
        rotation: Some(sampled(duration, 16, move |a| {
            Quat::from_rotation_z(side * (2.4 + 0.4 * (4.0 * a).sin()))
        })),
        ..BoneTrack::default()
    };
    let entries = vec![
        (HIPS, swing(duration, Vec3::Y, 0.6, 0.0)),
        (SPINE, swing(duration, Vec3::Z, 0.15, FRAC_PI_2)),
        (HEAD, swing(duration, Vec3::X, 0.2, 0.0)),
        (L_UPPER_ARM, raised(1.0)),
        (R_UPPER_ARM, raised(-1.0)),
        (L_FOREARM, swing(duration, Vec3::Z, 0.5, 0.0)),
        (R_FOREARM, swing(duration, Vec3::Z, -0.5, 0.0)),
        (CHEST, swing(duration, Vec3::Y, 0.3, TAU / 2.0)),
        (L_THIGH, swing(duration, Vec3::Z, 0.15, 0.0)),
        (R_THIGH, swing(duration, Vec3::Z, 0.15, 0.0)),
    ];
    AnimationClip::new("dance", skeleton.clone(), tracks(&skeleton, entries), Some(duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn clips_share_one_skeleton() {
        let clips = ClipSet::procedural();
        assert!(Arc::ptr_eq(&clips.idle.skeleton, &clips.walk.skeleton));
        assert!(Arc::ptr_eq(&clips.walk.skeleton, &clips.dance.skeleton));
        assert_eq!(clips.skeleton().len(), 12);
    }

    #[test]
    fn clip_durations() {
        let clips = ClipSet::procedural();
        assert_relative_eq!(clips.idle.duration, 2.0);
        assert_relative_eq!(clips.walk.duration, 1.0);
        assert_relative_eq!(clips.dance.duration, 4.0);
    }

    #[test]
    fn walk_cycle_loops_seamlessly() {
        let walk = ClipSet::procedural().walk;
        let start = walk.skinning_matrices(0.0);
        let end = walk.skinning_matrices(walk.duration);
        for (a, b) in start.iter().zip(&end) {
            assert!(a.abs_diff_eq(*b, 1e-4));
        }
    }

    #[test]
    fn head_sits_above_hips() {
        let clips = ClipSet::procedural();
        let globals = clips.idle.global_transforms(0.0);
        assert!(globals[HEAD].w_axis.y > globals[HIPS].w_axis.y);
        assert_eq!(clips.skeleton().find("head"), Some(HEAD));
    }
}
