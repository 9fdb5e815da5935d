use std::sync::Arc;

use super::animator::Animator;
use crate::model::{AnimationClip, ClipSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Idle,
    Walking,
    /// Dance started at this time (seconds on the frame clock).
    Dancing { since: f32 },
}

/// Chooses between idle, walk and dance clips and drives the [`Animator`].
///
/// A dance runs for at least its clip duration; movement input is ignored until then.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    clips: ClipSet,
    state: PlaybackState,
    animator: Animator,
}

impl PlaybackController {
    pub fn new(clips: ClipSet) -> Self {
        let animator = Animator::new(clips.idle.clone());
        Self {
            clips,
            state: PlaybackState::Idle,
            animator,
        }
    }

    /// Picks the clip for this frame, then advances playback by `dt`.
    pub fn update(&mut self, now: f32, moving: bool, dance_pressed: bool, dt: f32) {
        if dance_pressed && !matches!(self.state, PlaybackState::Dancing { .. }) {
            tracing::debug!(at = now, "dance started");
            self.state = PlaybackState::Dancing { since: now };
        }

        if let PlaybackState::Dancing { since } = self.state {
            if now - since > self.clips.dance.duration {
                tracing::debug!(at = now, "dance finished");
                self.state = Self::movement_state(moving);
            }
        } else {
            self.state = Self::movement_state(moving);
        }

        let clip = self.clip_for(self.state).clone();
        self.animator.play(&clip);
        self.animator.advance(dt);
    }

    fn movement_state(moving: bool) -> PlaybackState {
        if moving {
            PlaybackState::Walking
        } else {
            PlaybackState::Idle
        }
    }

    fn clip_for(&self, state: PlaybackState) -> &Arc<AnimationClip> {
        match state {
            PlaybackState::Idle => &self.clips.idle,
            PlaybackState::Walking => &self.clips.walk,
            PlaybackState::Dancing { .. } => &self.clips.dance,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_dancing(&self) -> bool {
        matches!(self.state, PlaybackState::Dancing { .. })
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn clips(&self) -> &ClipSet {
        &self.clips
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            PlaybackState::Idle => "idle",
            PlaybackState::Walking => "walk",
            PlaybackState::Dancing { .. } => "dance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PlaybackController {
        PlaybackController::new(ClipSet::procedural())
    }

    #[test]
    fn starts_idle() {
        let ctrl = controller();
        assert_eq!(ctrl.state(), PlaybackState::Idle);
        assert!(Arc::ptr_eq(ctrl.animator().current(), &ctrl.clips().idle));
    }

    #[test]
    fn movement_selects_walk_and_back() {
        let mut ctrl = controller();
        ctrl.update(0.0, true, false, 0.016);
        assert_eq!(ctrl.state(), PlaybackState::Walking);
        assert!(Arc::ptr_eq(ctrl.animator().current(), &ctrl.clips().walk));
        ctrl.update(0.1, false, false, 0.016);
        assert_eq!(ctrl.state(), PlaybackState::Idle);
    }

    #[test]
    fn dance_ignores_movement_until_clip_ends() {
        let mut ctrl = controller();
        let dance_len = ctrl.clips().dance.duration;
        ctrl.update(1.0, false, true, 0.016);
        assert_eq!(ctrl.state(), PlaybackState::Dancing { since: 1.0 });

        ctrl.update(1.0 + dance_len * 0.5, true, false, 0.016);
        assert!(ctrl.is_dancing());
        assert!(Arc::ptr_eq(ctrl.animator().current(), &ctrl.clips().dance));

        ctrl.update(1.0 + dance_len + 0.01, true, false, 0.016);
        assert_eq!(ctrl.state(), PlaybackState::Walking);
    }

    #[test]
    fn pressing_dance_again_does_not_restart() {
        let mut ctrl = controller();
        ctrl.update(0.0, false, true, 0.5);
        ctrl.update(0.5, false, true, 0.5);
        assert_eq!(ctrl.state(), PlaybackState::Dancing { since: 0.0 });
        assert!(ctrl.animator().elapsed() > 0.5);
    }

    #[test]
    fn clip_switch_resets_playback() {
        let mut ctrl = controller();
        ctrl.update(0.0, false, false, 0.8);
        assert!(ctrl.animator().elapsed() > 0.0);
        ctrl.update(0.8, true, false, 0.0);
        assert_eq!(ctrl.animator().elapsed(), 0.0);
    }
}
