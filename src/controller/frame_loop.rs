use std::time::Instant;

use glam::{Mat4, Vec3};

use super::input::InputState;
use crate::config::{AssetPaths, WindowConfig};
use crate::model::{Camera, SceneLighting};
use crate::utils::{Mesh, MeshId};

const MAX_FRAME_DT: f32 = 0.1;

/// Wall-clock frame timing: clamped delta, total elapsed time, FPS over one-second windows.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f32,
    dt: f32,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            dt: 0.0,
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    /// Samples the wall clock and returns this frame's delta.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = (now - self.last).as_secs_f32();
        self.last = now;
        self.advance(raw)
    }

    /// Advances by a raw delta (seconds). The returned step is clamped to `[0, 0.1]`;
    /// the FPS counter uses the unclamped wall time.
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        let raw_dt = if raw_dt.is_finite() { raw_dt.max(0.0) } else { 0.0 };
        let dt = raw_dt.min(MAX_FRAME_DT);
        self.dt = dt;
        self.elapsed += dt;

        self.frame_count += 1;
        self.fps_timer += raw_dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }
        dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame timing handed to a demo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub dt: f32,
    pub time: f32,
}

/// One instance of a registered mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: Vec3,
    /// Unlit items are drawn in flat colour (light markers).
    pub lit: bool,
    /// Sample the scene texture and modulate it by `color`.
    pub textured: bool,
}

impl DrawItem {
    pub fn lit(mesh: MeshId, model: Mat4, color: Vec3) -> Self {
        Self {
            mesh,
            model,
            color,
            lit: true,
            textured: false,
        }
    }

    pub fn unlit(mesh: MeshId, model: Mat4, color: Vec3) -> Self {
        Self {
            lit: false,
            ..Self::lit(mesh, model, color)
        }
    }

    pub fn textured(self) -> Self {
        Self {
            textured: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub items: Vec<DrawItem>,
}

impl DrawList {
    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// CPU-side resources a demo registers before the first frame.
#[derive(Debug, Default)]
pub struct SceneAssets {
    pub meshes: Vec<Mesh>,
    pub texture: Option<image::RgbaImage>,
}

impl SceneAssets {
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }
}

/// Text shown by the overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub heading: String,
    pub lines: Vec<String>,
    pub banner: Option<String>,
    pub controls: Vec<(&'static str, &'static str)>,
}

/// Whether the app should keep running after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A self-contained scene driven by the shared application runner.
pub trait Demo {
    fn window(&self) -> &WindowConfig;

    /// Load meshes and textures; failures fall back to placeholders.
    fn load(&mut self, paths: &AssetPaths) -> SceneAssets;

    fn camera(&self) -> &Camera;

    fn resize(&mut self, width: u32, height: u32);

    fn update(&mut self, frame: FrameInfo, input: &mut InputState) -> Flow;

    fn lighting(&self, frame: FrameInfo) -> SceneLighting;

    fn draw(&self, frame: FrameInfo, list: &mut DrawList);

    fn hud(&self) -> Hud;

    /// Desired window title; the runner only touches the window when it differs.
    fn title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::new();
        assert_relative_eq!(clock.advance(0.5), 0.1);
        assert_relative_eq!(clock.advance(-1.0), 0.0);
        assert_relative_eq!(clock.advance(f32::NAN), 0.0);
        assert_relative_eq!(clock.elapsed(), 0.1);
    }

    #[test]
    fn fps_is_averaged_over_a_second() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(0.02);
        }
        assert_relative_eq!(clock.fps(), 50.0, epsilon = 0.5);
    }

    #[test]
    fn fps_reports_slow_frames_unclamped() {
        let mut clock = FrameClock::new();
        for _ in 0..4 {
            assert_relative_eq!(clock.advance(0.25), 0.1);
        }
        assert_relative_eq!(clock.fps(), 4.0, epsilon = 1e-4);
        assert_relative_eq!(clock.elapsed(), 0.4, epsilon = 1e-6);
    }

    #[test]
    fn mesh_ids_are_sequential() {
        let mut assets = SceneAssets::default();
        let a = assets.add_mesh(Mesh::empty());
        let b = assets.add_mesh(Mesh::empty());
        assert_eq!((a, b), (MeshId(0), MeshId(1)));
    }

    #[test]
    fn unlit_keeps_everything_else() {
        let item = DrawItem::unlit(MeshId(2), Mat4::IDENTITY, Vec3::ONE).textured();
        assert!(!item.lit);
        assert!(item.textured);
        assert_eq!(item.mesh, MeshId(2));
    }
}
