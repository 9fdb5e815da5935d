use glam::Vec3;

use super::collision::Aabb;

/// A collectible item. Once collected it stays collected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub position: Vec3,
    pub half_extents: Vec3,
    collected: bool,
}

impl Pickup {
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            half_extents,
            collected: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Returns `true` only on the first call.
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

/// Static box the player cannot move into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl Obstacle {
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            half_extents,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_is_one_way() {
        let mut bone = Pickup::new(Vec3::ZERO, Vec3::splat(0.3));
        assert!(!bone.is_collected());
        assert!(bone.collect());
        assert!(!bone.collect());
        assert!(bone.is_collected());
    }

    #[test]
    fn bounds_follow_position() {
        let can = Obstacle::new(Vec3::new(5.0, 0.0, -3.0), Vec3::new(0.6, 1.0, 0.6));
        let b = can.bounds();
        assert!(b.min.abs_diff_eq(Vec3::new(4.4, -1.0, -3.6), 1e-6));
        assert!(b.max.abs_diff_eq(Vec3::new(5.6, 1.0, -2.4), 1e-6));
    }
}
