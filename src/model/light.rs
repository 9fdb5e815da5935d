use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

/// Point lights feed the shader in a fixed-size array.
pub const MAX_POINT_LIGHTS: usize = 4;

/// A coloured light that orbits around its base position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub base: Vec3,
    pub color: Vec3,
}

impl LightSource {
    pub const fn new(base: Vec3, color: Vec3) -> Self {
        Self { base, color }
    }

    /// World position of light `index` at time `t`.
    pub fn position(&self, index: usize, t: f32) -> Vec3 {
        self.base + orbit_offset(index, t)
    }

    /// Small spinning, pulsing marker cube drawn at the light's position.
    pub fn marker_matrix(&self, index: usize, t: f32) -> Mat4 {
        let i = index as f32;
        let scale = 0.2 + 0.1 * (t * 6.0 + i).sin();
        Mat4::from_translation(self.position(index, t))
            * Mat4::from_scale(Vec3::splat(scale))
            * Mat4::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), t * 3.0 + i)
    }
}

/// Offset of light `index` from its base: a breathing horizontal orbit plus a vertical bob.
pub fn orbit_offset(index: usize, t: f32) -> Vec3 {
    let i = index as f32;
    let offset = i * FRAC_PI_2;
    let radius = 2.0 + (t * 0.3 + offset).sin();
    let speed = 0.8 + i * 0.2;
    Vec3::new(
        radius * (t * speed + offset).cos(),
        1.5 * (t * 0.7 + offset).sin(),
        radius * (t * speed + offset).sin(),
    )
}

/// The six coloured lights circling the sculpture.
pub fn sculpture_lights() -> Vec<LightSource> {
    vec![
        LightSource::new(Vec3::new(6.0, 4.0, 6.0), Vec3::new(1.0, 0.7, 0.3)),
        LightSource::new(Vec3::new(-6.0, 2.0, -6.0), Vec3::new(0.3, 0.7, 1.0)),
        LightSource::new(Vec3::new(0.0, -3.0, 8.0), Vec3::new(0.8, 0.3, 1.0)),
        LightSource::new(Vec3::new(8.0, 1.0, -4.0), Vec3::new(0.3, 1.0, 0.5)),
        LightSource::new(Vec3::new(-4.0, 6.0, 4.0), Vec3::new(1.0, 0.3, 0.3)),
        LightSource::new(Vec3::new(2.0, -2.0, -8.0), Vec3::new(0.3, 1.0, 1.0)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -1.0, -0.4),
            ambient: Vec3::new(0.05, 0.05, 0.08),
            diffuse: Vec3::new(0.2, 0.25, 0.35),
            specular: Vec3::new(0.3, 0.35, 0.5),
        }
    }
}

/// Constant, linear and quadratic falloff terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.07,
            quadratic: 0.017,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            attenuation: Attenuation::default(),
        }
    }
}

/// Cone light; cut-offs are stored as cosines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub inner_cos: f32,
    pub outer_cos: f32,
    pub attenuation: Attenuation,
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3, color: Vec3) -> Self {
        Self {
            position,
            direction,
            color,
            inner_cos: 15f32.to_radians().cos(),
            outer_cos: 20f32.to_radians().cos(),
            attenuation: Attenuation::default(),
        }
    }
}

/// Everything the lit shader needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLighting {
    pub directional: Option<DirectionalLight>,
    pub points: Vec<PointLight>,
    pub spot: Option<SpotLight>,
    pub ambient: Vec3,
    pub shininess: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            directional: None,
            points: Vec::new(),
            spot: None,
            ambient: Vec3::splat(0.1),
            shininess: 32.0,
        }
    }
}

impl SceneLighting {
    /// Sculpture rig: moonlight, the first four animated lights and a head-mounted spot.
    pub fn sculpture(lights: &[LightSource], t: f32, eye: Vec3, look: Vec3) -> Self {
        let points = lights
            .iter()
            .enumerate()
            .take(MAX_POINT_LIGHTS)
            .map(|(i, light)| PointLight::new(light.position(i, t), light.color))
            .collect();
        Self {
            directional: Some(DirectionalLight::default()),
            points,
            spot: Some(SpotLight::new(eye, look, Vec3::ONE)),
            ambient: Vec3::ZERO,
            shininess: 128.0,
        }
    }

    /// A single white point light.
    pub fn single_point(position: Vec3) -> Self {
        Self {
            points: vec![PointLight {
                position,
                color: Vec3::ONE,
                attenuation: Attenuation {
                    constant: 1.0,
                    linear: 0.0,
                    quadratic: 0.0,
                },
            }],
            ambient: Vec3::splat(0.2),
            ..Self::default()
        }
    }

    /// Soft ambient plus one key light.
    pub fn ambient_directional(direction: Vec3) -> Self {
        Self {
            directional: Some(DirectionalLight {
                direction,
                ambient: Vec3::splat(0.25),
                diffuse: Vec3::splat(0.8),
                specular: Vec3::splat(0.2),
            }),
            ambient: Vec3::ZERO,
            ..Self::default()
        }
    }
}
