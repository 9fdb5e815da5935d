use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

/// Colour the sculpture fades towards as instances get higher.
pub const ACCENT_COLOR: Vec3 = Vec3::new(0.8, 0.3, 0.9);

const PHASE_STEP: f32 = 0.15;

/// One animated cube of the sculpture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub base: Vec3,
    pub phase: f32,
    /// Rings and floating patterns slowly orbit the world Y axis; the spiral does not.
    pub orbiting: bool,
}

impl Instance {
    pub fn new(base: Vec3, phase: f32, orbiting: bool) -> Self {
        Self { base, phase, orbiting }
    }

    /// Base position plus a two-axis wobble.
    pub fn animated_position(&self, t: f32) -> Vec3 {
        let phase = self.phase;
        let wave = (t * 1.5 + phase).sin() * 0.4;
        let sway = (t * 0.8 + phase * 0.7).cos() * 0.3;
        self.base + Vec3::new(sway, wave, sway * 0.5)
    }

    /// Uniform scale: slow breathing plus a fast, small pulse.
    pub fn scale(&self, t: f32) -> f32 {
        let breathe = 0.3 + 0.15 * (t * 2.5 + self.phase * 0.8).sin();
        let pulse = 0.05 * (t * 8.0 + self.phase).sin();
        breathe + pulse
    }

    /// Model matrix `T · R_orbit · R_a · R_b · S` at elapsed time `t`.
    pub fn model_matrix(&self, t: f32) -> Mat4 {
        let phase = self.phase;
        let mut model = Mat4::from_translation(self.animated_position(t));
        if self.orbiting {
            model *= Mat4::from_rotation_y(t * 0.3 + phase);
        }
        model *= Mat4::from_axis_angle(Vec3::new(1.0, 0.3, 0.7).normalize(), t * 2.0 + phase);
        model *= Mat4::from_axis_angle(
            Vec3::new(0.2, 1.0, 0.1).normalize(),
            t * 1.2 + phase * 0.5,
        );
        model * Mat4::from_scale(Vec3::splat(self.scale(t)))
    }
}

/// Per-instance colour cycling over time, blended towards [`ACCENT_COLOR`] by height.
pub fn instance_color(index: usize, base: Vec3, t: f32) -> Vec3 {
    let c = index as f32 * 0.08 + t * 0.5;
    let cycled = Vec3::new(
        0.4 + 0.4 * c.sin(),
        0.5 + 0.3 * (c * 1.3 + 1.0).sin(),
        0.6 + 0.4 * (c * 0.7 + 2.0).sin(),
    );
    let height_factor = (base.y + 5.0) / 10.0;
    cycled.lerp(ACCENT_COLOR, height_factor * 0.3)
}

/// Counts for the three procedural groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub spiral_levels: usize,
    pub rings: usize,
    pub ring_segments: usize,
    pub pattern_count: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            spiral_levels: 20,
            rings: 3,
            ring_segments: 16,
            pattern_count: 24,
        }
    }
}

/// The full set of instances, in draw order.
#[derive(Debug, Clone, Default)]
pub struct Sculpture {
    instances: Vec<Instance>,
}

impl Sculpture {
    pub fn procedural() -> Self {
        Self::with_layout(LayoutParams::default())
    }

    /// Central spiral tower, stacked orbiting rings, then a floating wave pattern.
    pub fn with_layout(params: LayoutParams) -> Self {
        let mut bases: Vec<(Vec3, bool)> = Vec::new();

        for i in 0..params.spiral_levels {
            let i = i as f32;
            let height = i * 0.4 - 4.0;
            let angle = i * 0.5;
            let radius = 2.0 + (i * 0.3).sin();
            bases.push((Vec3::new(radius * angle.cos(), height, radius * angle.sin()), false));
        }

        for ring in 0..params.rings {
            let ring_height = ring as f32 * 3.0 - 2.0;
            let ring_radius = 5.0 + ring as f32 * 1.5;
            for i in 0..params.ring_segments {
                let angle = i as f32 / params.ring_segments as f32 * TAU;
                bases.push((
                    Vec3::new(ring_radius * angle.cos(), ring_height, ring_radius * angle.sin()),
                    true,
                ));
            }
        }

        for i in 0..params.pattern_count {
            let angle = i as f32 / params.pattern_count as f32 * TAU;
            let radius = 8.0;
            let y = (angle * 3.0).sin() * 2.0;
            bases.push((Vec3::new(radius * angle.cos(), y, radius * angle.sin()), true));
        }

        let instances = bases
            .into_iter()
            .enumerate()
            .map(|(i, (base, orbiting))| Instance::new(base, i as f32 * PHASE_STEP, orbiting))
            .collect();

        Self { instances }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// `(model, colour)` for every instance at time `t`.
    pub fn frame(&self, t: f32) -> impl Iterator<Item = (Mat4, Vec3)> + '_ {
        self.instances
            .iter()
            .enumerate()
            .map(move |(i, inst)| (inst.model_matrix(t), instance_color(i, inst.base, t)))
    }
}
