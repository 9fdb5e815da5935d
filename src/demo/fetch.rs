use glam::{Mat4, Vec3};

use crate::config::{AssetPaths, FetchConfig, WindowConfig};
use crate::controller::game::{bone_color, bone_matrix};
use crate::controller::{
    Demo, DrawItem, DrawList, FetchGame, Flow, FrameInfo, Hud, InputProcessor, InputState, SceneAssets,
};
use crate::model::{Camera, SceneLighting};
use crate::utils::MeshId;
use crate::view::assets::load_mesh_or_warn;

const PLAYER_COLOR: Vec3 = Vec3::new(0.75, 0.55, 0.35);
const OBSTACLE_COLOR: Vec3 = Vec3::new(0.45, 0.5, 0.55);
const OBSTACLE_MODEL_SCALE: f32 = 0.025;
/// Bone and player matrices already carry these scales.
const BONE_MODEL_SCALE: f32 = 0.05;
const PLAYER_MODEL_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
struct Model {
    mesh: MeshId,
    /// Applied after the game's own model matrix.
    fit: Mat4,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            mesh: MeshId(0),
            fit: Mat4::IDENTITY,
        }
    }
}

/// Bone-collecting game: drive the dog with WASD, hold R to spin.
pub struct FetchDemo {
    config: FetchConfig,
    game: FetchGame,
    camera: Camera,
    processor: InputProcessor,
    player: Model,
    bone: Model,
    obstacle: Model,
}

impl FetchDemo {
    pub fn new(config: FetchConfig) -> Self {
        let game = FetchGame::new(&config);
        let mut camera = Camera::new(config.window.width, config.window.height);
        game.follow_camera().apply(&game.pose, &mut camera);
        Self {
            game,
            camera,
            processor: InputProcessor::default(),
            player: Model::default(),
            bone: Model::default(),
            obstacle: Model::default(),
            config,
        }
    }

    pub fn game(&self) -> &FetchGame {
        &self.game
    }
}

impl Default for FetchDemo {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

fn register(
    assets: &mut SceneAssets,
    path: std::path::PathBuf,
    loaded_scale: f32,
    half_extents: Vec3,
    built_in_scale: f32,
) -> Model {
    let (mesh, fit) = super::model_or_box(load_mesh_or_warn(path), loaded_scale, half_extents);
    Model {
        mesh: assets.add_mesh(mesh),
        fit: Mat4::from_scale(Vec3::splat(1.0 / built_in_scale)) * fit,
    }
}

impl Demo for FetchDemo {
    fn window(&self) -> &WindowConfig {
        &self.config.window
    }

    fn load(&mut self, paths: &AssetPaths) -> SceneAssets {
        let mut assets = SceneAssets::default();
        let config = &self.config;
        self.player = register(
            &mut assets,
            paths.resolve(&config.player_model),
            PLAYER_MODEL_SCALE,
            config.player.half_extents,
            PLAYER_MODEL_SCALE,
        );
        self.bone = register(
            &mut assets,
            paths.resolve(&config.pickup_model),
            BONE_MODEL_SCALE,
            config.pickup_half_extents,
            BONE_MODEL_SCALE,
        );
        self.obstacle = register(
            &mut assets,
            paths.resolve(&config.obstacle_model),
            OBSTACLE_MODEL_SCALE,
            config.obstacle_half_extents,
            1.0,
        );
        tracing::info!(bones = self.game.total(), "fetch ready");
        assets
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    fn update(&mut self, frame: FrameInfo, input: &mut InputState) -> Flow {
        let intent = self.processor.move_intent(input);
        let spinning = self.processor.is_spinning(input);
        let was_complete = self.game.is_complete();
        self.game.update(intent, spinning, frame.dt);
        if self.game.is_complete() && !was_complete {
            tracing::info!("all bones collected");
        }
        self.game.follow_camera().apply(&self.game.pose, &mut self.camera);
        Flow::Continue
    }

    fn lighting(&self, _frame: FrameInfo) -> SceneLighting {
        SceneLighting::single_point(self.config.light_position)
    }

    fn draw(&self, frame: FrameInfo, list: &mut DrawList) {
        let t = frame.time;
        list.push(DrawItem::lit(
            self.player.mesh,
            self.game.player_matrix() * self.player.fit,
            PLAYER_COLOR,
        ));
        for obstacle in &self.game.obstacles {
            list.push(DrawItem::lit(
                self.obstacle.mesh,
                Mat4::from_translation(obstacle.position) * self.obstacle.fit,
                OBSTACLE_COLOR,
            ));
        }
        for pickup in self.game.remaining() {
            list.push(DrawItem::lit(
                self.bone.mesh,
                bone_matrix(pickup.position, t) * self.bone.fit,
                bone_color(t),
            ));
        }
    }

    fn hud(&self) -> Hud {
        let pos = self.game.pose.position;
        Hud {
            heading: "Fetch".into(),
            lines: vec![
                self.game.title(),
                format!("Position: {:.1}, {:.1}", pos.x, pos.z),
                format!("Heading: {:.0}°", self.game.pose.heading.to_degrees()),
            ],
            banner: self
                .game
                .is_complete()
                .then(|| "All bones collected. Good dog!".to_string()),
            controls: vec![
                ("W/S", "forward / back"),
                ("A/D", "turn"),
                ("R (hold)", "spin"),
                ("Esc", "quit"),
            ],
        }
    }

    fn title(&self) -> Option<String> {
        Some(self.game.title())
    }
}
