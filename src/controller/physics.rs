use glam::Vec3;

use crate::model::{Aabb, Obstacle, Pickup};

/// What happened to the player box this frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Indices of pickups collected this frame.
    pub collected: Vec<usize>,
    /// The move was rolled back because it ended inside an obstacle.
    pub blocked: bool,
}

/// Pickup collection and obstacle blocking against the player's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSystem {
    pub player_half_extents: Vec3,
}

impl CollisionSystem {
    pub fn new(player_half_extents: Vec3) -> Self {
        Self {
            player_half_extents,
        }
    }

    pub fn player_bounds(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.player_half_extents)
    }

    /// Marks every uncollected pickup touching the player box as collected.
    pub fn collect_pickups(&self, position: Vec3, pickups: &mut [Pickup]) -> Vec<usize> {
        let player = self.player_bounds(position);
        let mut collected = Vec::new();
        for (i, pickup) in pickups.iter_mut().enumerate() {
            if pickup.is_collected() {
                continue;
            }
            if player.overlaps(&pickup.bounds()) && pickup.collect() {
                tracing::debug!(index = i, "pickup collected");
                collected.push(i);
            }
        }
        collected
    }

    pub fn is_blocked(&self, position: Vec3, obstacles: &[Obstacle]) -> bool {
        let player = self.player_bounds(position);
        obstacles.iter().any(|o| player.overlaps(&o.bounds()))
    }

    /// Pickups are tested at the moved position first; then, if the moved box hits an
    /// obstacle, `position` is reset to `previous`.
    pub fn resolve(
        &self,
        previous: Vec3,
        position: &mut Vec3,
        pickups: &mut [Pickup],
        obstacles: &[Obstacle],
    ) -> CollisionOutcome {
        let collected = self.collect_pickups(*position, pickups);
        let blocked = self.is_blocked(*position, obstacles);
        if blocked {
            tracing::debug!(from = ?previous, to = ?*position, "move blocked by obstacle");
            *position = previous;
        }
        CollisionOutcome { collected, blocked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> CollisionSystem {
        CollisionSystem::new(Vec3::new(0.5, 0.4, 0.8))
    }

    #[test]
    fn collected_pickups_are_skipped() {
        let sys = system();
        let mut pickups = [Pickup::new(Vec3::ZERO, Vec3::splat(0.3))];
        assert_eq!(sys.collect_pickups(Vec3::ZERO, &mut pickups), vec![0]);
        assert!(sys.collect_pickups(Vec3::ZERO, &mut pickups).is_empty());
    }

    #[test]
    fn blocked_move_rolls_back() {
        let sys = system();
        let obstacles = [Obstacle::new(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.6))];
        let previous = Vec3::ZERO;
        let mut position = Vec3::new(0.0, 0.0, -1.0);
        let outcome = sys.resolve(previous, &mut position, &mut [], &obstacles);
        assert!(outcome.blocked);
        assert_eq!(position, previous);
    }

    #[test]
    fn pickup_touched_during_blocked_move_is_still_collected() {
        let sys = system();
        let obstacles = [Obstacle::new(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.6))];
        let mut pickups = [Pickup::new(Vec3::new(0.0, 0.0, -1.2), Vec3::splat(0.3))];
        let mut position = Vec3::new(0.0, 0.0, -1.0);
        let outcome = sys.resolve(Vec3::ZERO, &mut position, &mut pickups, &obstacles);
        assert!(outcome.blocked);
        assert_eq!(outcome.collected, vec![0]);
        assert!(pickups[0].is_collected());
    }

    #[test]
    fn free_move_is_kept() {
        let sys = system();
        let obstacles = [Obstacle::new(Vec3::new(5.0, 0.0, -3.0), Vec3::new(0.6, 1.0, 0.6))];
        let mut position = Vec3::new(0.0, 0.5, -1.0);
        let outcome = sys.resolve(Vec3::new(0.0, 0.5, 0.0), &mut position, &mut [], &obstacles);
        assert!(!outcome.blocked);
        assert_eq!(position, Vec3::new(0.0, 0.5, -1.0));
    }
}
