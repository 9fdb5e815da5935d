use glam::Vec3;

/// Axis-aligned bounding box in world coordinates.
///
/// Built on demand from a center and half extents; has no identity of its own.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box centered at `center` extending `half` along each axis.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns `true` unless some axis separates the boxes.
    ///
    /// Rejection uses strict comparisons, so boxes that touch on a face, edge or corner
    /// count as overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        for axis in 0..3 {
            if self.max[axis] < other.min[axis] || self.min[axis] > other.max[axis] {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> std::ops::Range<f32> {
        -50.0f32..50.0
    }

    fn extent() -> std::ops::Range<f32> {
        0.0f32..5.0
    }

    fn vec3(s: impl Strategy<Value = f32> + Clone) -> impl Strategy<Value = Vec3> {
        (s.clone(), s.clone(), s).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    #[test]
    fn touching_faces_overlap() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
        let b = Aabb::from_center_half_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn gap_on_one_axis_separates() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
        let b = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 1.01), Vec3::splat(0.5));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn corners_span_center_plus_minus_half() {
        let b = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, -3.0), Vec3::new(0.6, 1.0, 0.6));
        assert!(b.min.abs_diff_eq(Vec3::new(4.4, -1.0, -3.6), 1e-6));
        assert!(b.max.abs_diff_eq(Vec3::new(5.6, 1.0, -2.4), 1e-6));
    }

    proptest! {
        #[test]
        fn box_overlaps_itself(c in vec3(coord()), h in vec3(extent())) {
            let b = Aabb::from_center_half_extents(c, h);
            prop_assert!(b.overlaps(&b));
        }

        #[test]
        fn overlap_is_commutative(
            c1 in vec3(coord()), h1 in vec3(extent()),
            c2 in vec3(coord()), h2 in vec3(extent()),
        ) {
            let a = Aabb::from_center_half_extents(c1, h1);
            let b = Aabb::from_center_half_extents(c2, h2);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn separation_on_any_axis_prevents_overlap(
            c1 in vec3(coord()), h1 in vec3(extent()),
            h2 in vec3(extent()),
            others in (coord(), coord()),
            axis in 0usize..3,
            gap in 0.01f32..10.0,
            flip in any::<bool>(),
        ) {
            let reach = h1[axis] + h2[axis] + gap;
            let mut c2 = Vec3::new(others.0, others.1, others.0);
            c2[axis] = if flip { c1[axis] - reach } else { c1[axis] + reach };
            let a = Aabb::from_center_half_extents(c1, h1);
            let b = Aabb::from_center_half_extents(c2, h2);
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }
    }
}
