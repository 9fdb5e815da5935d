use std::sync::Arc;

use glam::Mat4;

use crate::model::AnimationClip;

/// Playback cursor over a shared clip.
#[derive(Debug, Clone)]
pub struct Animator {
    current: Arc<AnimationClip>,
    elapsed: f32,
}

impl Animator {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            current: clip,
            elapsed: 0.0,
        }
    }

    /// Switches to `clip` and rewinds, unless it is already the current clip.
    pub fn play(&mut self, clip: &Arc<AnimationClip>) {
        if Arc::ptr_eq(&self.current, clip) {
            return;
        }
        tracing::debug!(from = %self.current.name, to = %clip.name, "switching clip");
        self.current = Arc::clone(clip);
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        let duration = self.current.duration;
        if duration <= 0.0 {
            self.elapsed = 0.0;
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= duration {
            self.elapsed = self.elapsed.rem_euclid(duration);
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn current(&self) -> &Arc<AnimationClip> {
        &self.current
    }

    /// Skinning matrices in joint-index order.
    pub fn bone_matrices(&self) -> Vec<Mat4> {
        self.current.skinning_matrices(self.elapsed)
    }

    /// Model-space joint transforms, for drawing the skeleton itself.
    pub fn bone_globals(&self) -> Vec<Mat4> {
        self.current.global_transforms(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Skeleton, Transform};
    use approx::assert_relative_eq;

    fn clip(name: &str, duration: f32) -> Arc<AnimationClip> {
        let skeleton = Arc::new(Skeleton::from_rest_pose(vec![(
            "root".into(),
            None,
            Transform::IDENTITY,
        )]));
        Arc::new(AnimationClip::new(name, skeleton, vec![], Some(duration)))
    }

    #[test]
    fn replaying_the_same_clip_keeps_time() {
        let a = clip("a", 2.0);
        let mut animator = Animator::new(a.clone());
        animator.advance(0.7);
        animator.play(&a);
        animator.play(&a);
        assert_relative_eq!(animator.elapsed(), 0.7);
    }

    #[test]
    fn switching_clip_rewinds() {
        let a = clip("a", 2.0);
        let b = clip("b", 2.0);
        let mut animator = Animator::new(a);
        animator.advance(0.7);
        animator.play(&b);
        assert_eq!(animator.elapsed(), 0.0);
        assert!(Arc::ptr_eq(animator.current(), &b));
    }

    #[test]
    fn identical_content_is_still_a_different_clip() {
        let a = clip("same", 1.0);
        let twin = Arc::new((*a).clone());
        let mut animator = Animator::new(a);
        animator.advance(0.5);
        animator.play(&twin);
        assert_eq!(animator.elapsed(), 0.0);
    }

    #[test]
    fn advance_wraps_at_duration() {
        let mut animator = Animator::new(clip("loop", 2.0));
        animator.advance(2.5);
        assert_relative_eq!(animator.elapsed(), 0.5, epsilon = 1e-6);
        animator.advance(1.5);
        assert_relative_eq!(animator.elapsed(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_length_clip_pins_time() {
        let mut animator = Animator::new(clip("pose", 0.0));
        animator.advance(0.3);
        assert_eq!(animator.elapsed(), 0.0);
    }

    #[test]
    fn one_matrix_per_bone() {
        let animator = Animator::new(crate::model::ClipSet::procedural().walk);
        assert_eq!(animator.bone_matrices().len(), 12);
        assert_eq!(animator.bone_globals().len(), 12);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn advancing_past_the_end_wraps(duration in 0.1f32..10.0, frac in 0.0f32..0.99) {
                let x = duration * frac;
                let mut animator = Animator::new(clip("p", duration));
                animator.advance(duration + x);
                prop_assert!((animator.elapsed() - x).abs() < 1e-4);
            }
        }
    }
}
