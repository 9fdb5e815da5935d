use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use super::input::MoveIntent;
use super::physics::{CollisionOutcome, CollisionSystem};
use super::player::{FollowCamera, PlayerController, Pose};
use crate::config::FetchConfig;
use crate::model::{Obstacle, Pickup};

const BONE_BASE_COLOR: Vec3 = Vec3::new(0.94, 0.88, 0.72);

const BONE_LAYOUT: [Vec3; 10] = [
    Vec3::new(2.0, 0.2, -4.0),
    Vec3::new(-1.0, 0.2, 2.0),
    Vec3::new(4.0, 0.2, 1.0),
    Vec3::new(-4.0, 0.2, -3.0),
    Vec3::new(-6.0, 0.2, 4.0),
    Vec3::new(1.0, 0.2, 7.0),
    Vec3::new(7.0, 0.2, 5.0),
    Vec3::new(-2.0, 0.2, -8.0),
    Vec3::new(8.0, 0.2, -7.0),
    Vec3::new(-8.0, 0.2, -1.0),
];

/// Pickup positions for `count` bones: the hand-placed layout first, then a wide ring.
pub fn bone_positions(count: usize) -> Vec<Vec3> {
    let extra = count.saturating_sub(BONE_LAYOUT.len());
    BONE_LAYOUT
        .iter()
        .copied()
        .take(count)
        .chain((0..extra).map(|i| {
            let angle = i as f32 / extra as f32 * TAU;
            Vec3::new(12.0 * angle.cos(), 0.2, 12.0 * angle.sin())
        }))
        .collect()
}

/// Bone model: spins about Y at 2 rad/s.
pub fn bone_matrix(position: Vec3, t: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(0.05)) * Mat4::from_rotation_y(t * 2.0)
}

/// Bone tint with a subtle pulse.
pub fn bone_color(t: f32) -> Vec3 {
    let pulse = ((t * 2.0).sin() * 0.5 + 0.5) * 0.04;
    (BONE_BASE_COLOR + Vec3::splat(pulse)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// State of the fetch game, independent of any rendering.
#[derive(Debug, Clone)]
pub struct FetchGame {
    pub pose: Pose,
    pub pickups: Vec<Pickup>,
    pub obstacles: Vec<Obstacle>,
    controller: PlayerController,
    collision: CollisionSystem,
    follow: FollowCamera,
    spin_speed: f32,
    spin_angle: f32,
}

impl FetchGame {
    pub fn new(config: &FetchConfig) -> Self {
        let pickups = bone_positions(config.pickup_count)
            .into_iter()
            .map(|p| Pickup::new(p, config.pickup_half_extents))
            .collect();
        let obstacles = vec![Obstacle::new(
            config.obstacle_position,
            config.obstacle_half_extents,
        )];
        Self::with_layout(config, pickups, obstacles)
    }

    pub fn with_layout(config: &FetchConfig, pickups: Vec<Pickup>, obstacles: Vec<Obstacle>) -> Self {
        Self {
            pose: Pose::new(config.player.start, config.player.start_heading),
            pickups,
            obstacles,
            controller: PlayerController::from_config(&config.player),
            collision: CollisionSystem::new(config.player.half_extents),
            follow: FollowCamera::from_config(&config.camera),
            spin_speed: config.spin_speed,
            spin_angle: 0.0,
        }
    }

    /// Move, collect, then block. `spinning` turns the model in place while held.
    pub fn update(&mut self, intent: MoveIntent, spinning: bool, dt: f32) -> CollisionOutcome {
        let previous = self.pose.position;
        self.controller.update(&mut self.pose, intent, dt);
        let outcome = self.collision.resolve(
            previous,
            &mut self.pose.position,
            &mut self.pickups,
            &self.obstacles,
        );

        if spinning {
            self.spin_angle = (self.spin_angle + self.spin_speed * dt).rem_euclid(TAU);
        }

        if !outcome.collected.is_empty() {
            tracing::info!(
                collected = self.collected_count(),
                total = self.total(),
                "bone picked up"
            );
        }
        outcome
    }

    pub fn collected_count(&self) -> usize {
        self.pickups.iter().filter(|p| p.is_collected()).count()
    }

    pub fn total(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_complete(&self) -> bool {
        self.collected_count() == self.total()
    }

    pub fn title(&self) -> String {
        format!("Bones: {}/{}", self.collected_count(), self.total())
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn follow_camera(&self) -> &FollowCamera {
        &self.follow
    }

    /// Player model: heading, then the extra spin, at half scale.
    pub fn player_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.pose.position)
            * Mat4::from_rotation_y(self.pose.heading + self.spin_angle)
            * Mat4::from_scale(Vec3::splat(0.5))
    }

    pub fn remaining(&self) -> impl Iterator<Item = &Pickup> + '_ {
        self.pickups.iter().filter(|p| !p.is_collected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forward() -> MoveIntent {
        MoveIntent {
            forward: true,
            ..MoveIntent::default()
        }
    }

    #[test]
    fn default_game_has_ten_bones() {
        let game = FetchGame::new(&FetchConfig::default());
        assert_eq!(game.total(), 10);
        assert_eq!(game.title(), "Bones: 0/10");
        assert!(game.pose.position.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn default_layout_is_clear_of_start_and_obstacle() {
        let config = FetchConfig::default();
        let game = FetchGame::new(&config);
        let sys = CollisionSystem::new(config.player.half_extents);
        let start = sys.player_bounds(game.pose.position);
        for bone in &game.pickups {
            assert!(!bone.bounds().overlaps(&start));
            assert!(!bone.bounds().overlaps(&game.obstacles[0].bounds()));
        }
    }

    #[test]
    fn extra_bones_go_on_a_ring() {
        let positions = bone_positions(12);
        assert_eq!(positions.len(), 12);
        assert!(positions[10].abs_diff_eq(Vec3::new(12.0, 0.2, 0.0), 1e-5));
        assert_eq!(bone_positions(2).len(), 2);
    }

    #[test]
    fn moving_onto_second_bone_collects_only_it() {
        let config = FetchConfig::default();
        let pickups = bone_positions(3)
            .into_iter()
            .map(|p| Pickup::new(p, Vec3::splat(0.3)))
            .collect();
        let mut game = FetchGame::with_layout(&config, pickups, Vec::new());

        // Turn around (heading pi faces +Z) and drive 1.5 units towards (-1, 0.2, 2).
        game.pose = Pose::new(Vec3::new(-1.0, 0.5, 0.0), std::f32::consts::PI);
        let outcome = game.update(forward(), false, 0.25);

        assert_eq!(outcome.collected, vec![1]);
        assert!(!game.pickups[0].is_collected());
        assert!(game.pickups[1].is_collected());
        assert!(!game.pickups[2].is_collected());
        assert_eq!(game.title(), "Bones: 1/3");
    }

    #[test]
    fn obstacle_ahead_blocks_movement() {
        let config = FetchConfig::default();
        let obstacles = vec![Obstacle::new(Vec3::new(0.0, 0.5, -2.0), Vec3::new(0.6, 1.0, 0.6))];
        let mut game = FetchGame::with_layout(&config, Vec::new(), obstacles);
        let before = game.pose.position;

        let outcome = game.update(forward(), false, 0.2);

        assert!(outcome.blocked);
        assert_eq!(game.pose.position, before);
    }

    #[test]
    fn open_ground_allows_movement() {
        let mut game = FetchGame::new(&FetchConfig::default());
        let outcome = game.update(forward(), false, 0.1);
        assert!(!outcome.blocked);
        assert!(game.pose.position.abs_diff_eq(Vec3::new(0.0, 0.5, -0.6), 1e-5));
    }

    #[test]
    fn spin_wraps_at_full_turn() {
        let mut game = FetchGame::new(&FetchConfig::default());
        for _ in 0..20 {
            game.update(MoveIntent::default(), true, 0.1);
        }
        // 240 deg/s for 2 s = 480 deg = 120 deg after wrapping
        assert_relative_eq!(game.spin_angle(), 120f32.to_radians(), epsilon = 1e-3);
        game.update(MoveIntent::default(), false, 1.0);
        assert_relative_eq!(game.spin_angle(), 120f32.to_radians(), epsilon = 1e-3);
    }

    #[test]
    fn bone_colour_stays_in_range() {
        for step in 0..100 {
            let c = bone_color(step as f32 * 0.1);
            assert!(c.max_element() <= 1.0);
            assert!(c.min_element() >= BONE_BASE_COLOR.min_element());
        }
        assert!(bone_color(0.0).abs_diff_eq(BONE_BASE_COLOR + Vec3::splat(0.02), 1e-6));
    }

    #[test]
    fn collecting_everything_completes_the_game() {
        let config = FetchConfig::default();
        let pickups = vec![Pickup::new(Vec3::new(0.0, 0.5, -1.0), Vec3::splat(0.3))];
        let mut game = FetchGame::with_layout(&config, pickups, Vec::new());
        assert!(!game.is_complete());
        game.update(forward(), false, 0.05);
        assert!(game.is_complete());
        assert_eq!(game.remaining().count(), 0);
    }
}
