use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and scale of one joint relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,
    pub rest: Transform,
    pub inverse_bind: Mat4,
}

/// Bone hierarchy shared by every clip authored against it.
///
/// Joint indices are fixed at construction and match the order of the skinning
/// matrices handed to the renderer. Parents need not precede their children; an
/// evaluation order is computed once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
    order: Vec<usize>,
}

impl Skeleton {
    pub fn new(mut joints: Vec<Joint>) -> Self {
        let count = joints.len();
        for joint in joints.iter_mut() {
            if joint.parent.is_some_and(|p| p >= count) {
                joint.parent = None;
            }
        }

        let mut order = Vec::with_capacity(count);
        let mut placed = vec![false; count];
        loop {
            let before = order.len();
            for (i, joint) in joints.iter().enumerate() {
                if placed[i] {
                    continue;
                }
                let ready = match joint.parent {
                    None => true,
                    Some(p) => placed[p],
                };
                if ready {
                    placed[i] = true;
                    order.push(i);
                }
            }
            if order.len() == count {
                break;
            }
            if order.len() == before {
                // Cyclic parent links: break the cycle by promoting the rest to roots.
                for (i, joint) in joints.iter_mut().enumerate() {
                    if !placed[i] {
                        joint.parent = None;
                        placed[i] = true;
                        order.push(i);
                    }
                }
                break;
            }
        }

        Self { joints, order }
    }

    /// Builds inverse bind matrices from the rest pose.
    pub fn from_rest_pose(joints: Vec<(String, Option<usize>, Transform)>) -> Self {
        let joints: Vec<Joint> = joints
            .into_iter()
            .map(|(name, parent, rest)| Joint {
                name,
                parent,
                rest,
                inverse_bind: Mat4::IDENTITY,
            })
            .collect();
        let mut skeleton = Self::new(joints);
        let rest: Vec<Transform> = skeleton.joints.iter().map(|j| j.rest).collect();
        let globals = skeleton.global_transforms(&rest);
        for (joint, global) in skeleton.joints.iter_mut().zip(globals) {
            joint.inverse_bind = global.inverse();
        }
        skeleton
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn rest_pose(&self) -> Vec<Transform> {
        self.joints.iter().map(|j| j.rest).collect()
    }

    /// Model-space transform of every joint for the given local pose.
    pub fn global_transforms(&self, local: &[Transform]) -> Vec<Mat4> {
        let mut globals = vec![Mat4::IDENTITY; self.joints.len()];
        for &i in &self.order {
            let local = local.get(i).copied().unwrap_or(self.joints[i].rest).to_mat4();
            globals[i] = match self.joints[i].parent {
                Some(p) => globals[p] * local,
                None => local,
            };
        }
        globals
    }

    /// `global · inverse_bind` for every joint, in joint-index order.
    pub fn skinning_matrices(&self, local: &[Transform]) -> Vec<Mat4> {
        self.global_transforms(local)
            .into_iter()
            .zip(&self.joints)
            .map(|(global, joint)| global * joint.inverse_bind)
            .collect()
    }
}

pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, factor: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(a: Self, b: Self, factor: f32) -> Self {
        a.lerp(b, factor)
    }
}

impl Interpolate for Quat {
    fn interpolate(a: Self, b: Self, factor: f32) -> Self {
        a.slerp(b, factor).normalize()
    }
}

/// Keyframes for one TRS component. `times` is in seconds and ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
}

impl<T: Interpolate> Channel<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>) -> Self {
        let len = times.len().min(values.len());
        let mut times = times;
        let mut values = values;
        times.truncate(len);
        values.truncate(len);
        Self { times, values }
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `t`, clamped to the first and last keyframe.
    pub fn sample(&self, t: f32) -> Option<T> {
        let first = *self.values.first()?;
        let last = *self.values.last()?;
        if t <= self.times[0] {
            return Some(first);
        }
        if t >= self.end_time() {
            return Some(last);
        }

        let next = self.times.partition_point(|&k| k <= t);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let factor = if span > 0.0 {
            (t - self.times[prev]) / span
        } else {
            0.0
        };
        Some(T::interpolate(self.values[prev], self.values[next], factor))
    }
}

/// Optional channels driving a single joint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    pub translation: Option<Channel<Vec3>>,
    pub rotation: Option<Channel<Quat>>,
    pub scale: Option<Channel<Vec3>>,
}

impl BoneTrack {
    pub fn end_time(&self) -> f32 {
        let t = self.translation.as_ref().map_or(0.0, Channel::end_time);
        let r = self.rotation.as_ref().map_or(0.0, Channel::end_time);
        let s = self.scale.as_ref().map_or(0.0, Channel::end_time);
        t.max(r).max(s)
    }

    /// Components without a channel keep their rest value.
    pub fn sample(&self, rest: Transform, t: f32) -> Transform {
        Transform {
            translation: self
                .translation
                .as_ref()
                .and_then(|c| c.sample(t))
                .unwrap_or(rest.translation),
            rotation: self
                .rotation
                .as_ref()
                .and_then(|c| c.sample(t))
                .unwrap_or(rest.rotation),
            scale: self
                .scale
                .as_ref()
                .and_then(|c| c.sample(t))
                .unwrap_or(rest.scale),
        }
    }
}

/// Named animation authored against a shared skeleton.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds.
    pub duration: f32,
    pub skeleton: Arc<Skeleton>,
    /// One entry per joint; `None` keeps the joint at rest.
    pub tracks: Vec<Option<BoneTrack>>,
}

impl AnimationClip {
    /// Pads or truncates `tracks` to the joint count. A `duration` of `None` is taken
    /// from the last keyframe.
    pub fn new(
        name: impl Into<String>,
        skeleton: Arc<Skeleton>,
        mut tracks: Vec<Option<BoneTrack>>,
        duration: Option<f32>,
    ) -> Self {
        tracks.resize_with(skeleton.len(), || None);
        let duration = duration.unwrap_or_else(|| {
            tracks
                .iter()
                .flatten()
                .map(BoneTrack::end_time)
                .fold(0.0, f32::max)
        });
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            skeleton,
            tracks,
        }
    }

    /// Local pose of every joint at `t` seconds.
    pub fn local_pose(&self, t: f32) -> Vec<Transform> {
        self.skeleton
            .joints()
            .iter()
            .zip(&self.tracks)
            .map(|(joint, track)| match track {
                Some(track) => track.sample(joint.rest, t),
                None => joint.rest,
            })
            .collect()
    }

    pub fn global_transforms(&self, t: f32) -> Vec<Mat4> {
        self.skeleton.global_transforms(&self.local_pose(t))
    }

    pub fn skinning_matrices(&self, t: f32) -> Vec<Mat4> {
        self.skeleton.skinning_matrices(&self.local_pose(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn two_bone_chain() -> Arc<Skeleton> {
        Arc::new(Skeleton::from_rest_pose(vec![
            ("root".into(), None, Transform::IDENTITY),
            ("tip".into(), Some(0), Transform::from_translation(Vec3::Y)),
        ]))
    }

    #[test]
    fn channel_interpolates_between_keys() {
        let c = Channel::new(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);
        let v = c.sample(0.25).unwrap();
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn channel_clamps_outside_key_range() {
        let c = Channel::new(vec![0.5, 1.0], vec![Vec3::ONE, Vec3::splat(3.0)]);
        assert_eq!(c.sample(0.0), Some(Vec3::ONE));
        assert_eq!(c.sample(7.0), Some(Vec3::splat(3.0)));
    }

    #[test]
    fn empty_channel_samples_nothing() {
        let c: Channel<Vec3> = Channel::new(vec![], vec![]);
        assert_eq!(c.sample(0.3), None);
    }

    #[test]
    fn rotation_channel_uses_slerp() {
        let q0 = Quat::IDENTITY;
        let q1 = Quat::from_rotation_y(FRAC_PI_2);
        let c = Channel::new(vec![0.0, 1.0], vec![q0, q1]);
        let mid = c.sample(0.5).unwrap();
        assert!(mid.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2 * 0.5), 1e-5));
    }

    #[test]
    fn rest_pose_skins_to_identity() {
        let skeleton = two_bone_chain();
        let skin = skeleton.skinning_matrices(&skeleton.rest_pose());
        for m in skin {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
    }

    #[test]
    fn child_inherits_parent_rotation() {
        let skeleton = two_bone_chain();
        let track = BoneTrack {
            rotation: Some(Channel::new(
                vec![0.0, 1.0],
                vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)],
            )),
            ..BoneTrack::default()
        };
        let clip = AnimationClip::new("bend", skeleton, vec![Some(track)], None);
        assert_relative_eq!(clip.duration, 1.0);

        let globals = clip.global_transforms(1.0);
        let tip = globals[1].w_axis.truncate();
        // +Y rotated a quarter turn about Z points along -X
        assert!(tip.abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn untracked_joints_keep_rest_transform() {
        let skeleton = two_bone_chain();
        let clip = AnimationClip::new("still", skeleton.clone(), vec![], Some(2.0));
        assert_eq!(clip.tracks.len(), 2);
        assert_eq!(clip.local_pose(0.7), skeleton.rest_pose());
    }

    #[test]
    fn children_listed_before_parents_still_resolve() {
        let skeleton = Skeleton::from_rest_pose(vec![
            ("tip".into(), Some(1), Transform::from_translation(Vec3::X)),
            ("root".into(), None, Transform::from_translation(Vec3::Y)),
        ]);
        let globals = skeleton.global_transforms(&skeleton.rest_pose());
        assert!(globals[0].w_axis.truncate().abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn cyclic_parents_do_not_hang() {
        let skeleton = Skeleton::new(vec![
            Joint {
                name: "a".into(),
                parent: Some(1),
                rest: Transform::IDENTITY,
                inverse_bind: Mat4::IDENTITY,
            },
            Joint {
                name: "b".into(),
                parent: Some(0),
                rest: Transform::IDENTITY,
                inverse_bind: Mat4::IDENTITY,
            },
        ]);
        assert_eq!(skeleton.global_transforms(&skeleton.rest_pose()).len(), 2);
    }
}
