use glam::{Mat4, Vec3};

use crate::config::{AssetPaths, DancerConfig, WindowConfig};
use crate::controller::{
    Demo, DrawItem, DrawList, FlyCameraController, Flow, FrameInfo, Hud, InputProcessor, InputState, KeyBindings,
    PlaybackController, PlayerController, Pose, SceneAssets,
};
use crate::model::{Camera, ClipSet, SceneLighting};
use crate::utils::{create_cube_mesh, MeshId};
use crate::view::assets::load_clip_set_or_procedural;

const JOINT_SIZE: f32 = 0.08;
const ROOT_COLOR: Vec3 = Vec3::new(1.0, 0.8, 0.3);
const JOINT_COLOR: Vec3 = Vec3::new(0.35, 0.75, 1.0);
const FLOOR_COLOR: Vec3 = Vec3::new(0.25, 0.25, 0.3);
const KEY_LIGHT_DIR: Vec3 = Vec3::new(-0.4, -1.0, -0.3);

/// Character animation controller: WASD walks the character, E dances, arrows fly the camera.
pub struct DancerDemo {
    config: DancerConfig,
    pose: Pose,
    mover: PlayerController,
    playback: PlaybackController,
    camera: Camera,
    fly: FlyCameraController,
    camera_keys: InputProcessor,
    character_keys: InputProcessor,
    cube: MeshId,
}

impl DancerDemo {
    pub fn new(config: DancerConfig) -> Self {
        Self::with_clips(config, ClipSet::procedural())
    }

    pub fn with_clips(config: DancerConfig, clips: ClipSet) -> Self {
        let camera = FlyCameraController::spawn(&config.camera, config.window.width, config.window.height);
        Self {
            pose: Pose::new(config.player.start, config.player.start_heading),
            mover: PlayerController::from_config(&config.player),
            character_keys: InputProcessor::new(KeyBindings::wasd()),
            playback: PlaybackController::new(clips),
            camera,
            fly: FlyCameraController::from_config(&config.camera),
            camera_keys: InputProcessor::new(KeyBindings::arrows()),
            cube: MeshId(0),
            config,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Character space to world: `T · R_y(heading) · S`.
    pub fn character_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.pose.position)
            * Mat4::from_rotation_y(self.pose.heading)
            * Mat4::from_scale(Vec3::splat(self.config.model_scale))
    }

    /// World position of every joint in the current pose.
    pub fn joint_positions(&self) -> Vec<Vec3> {
        let character = self.character_matrix();
        self.playback
            .animator()
            .bone_globals()
            .iter()
            .map(|global| (character * *global).transform_point3(Vec3::ZERO))
            .collect()
    }
}

impl Default for DancerDemo {
    fn default() -> Self {
        Self::new(DancerConfig::default())
    }
}

impl Demo for DancerDemo {
    fn window(&self) -> &WindowConfig {
        &self.config.window
    }

    fn load(&mut self, paths: &AssetPaths) -> SceneAssets {
        let clips = load_clip_set_or_procedural(
            paths.resolve(&self.config.idle_clip),
            paths.resolve(&self.config.walk_clip),
            paths.resolve(&self.config.dance_clip),
        );
        tracing::info!(
            joints = clips.skeleton().len(),
            idle = clips.idle.duration,
            walk = clips.walk.duration,
            dance = clips.dance.duration,
            "clips ready"
        );
        self.playback = PlaybackController::new(clips);

        let mut assets = SceneAssets::default();
        self.cube = assets.add_mesh(create_cube_mesh());
        assets
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    fn update(&mut self, frame: FrameInfo, input: &mut InputState) -> Flow {
        let intent = self.character_keys.move_intent(input);
        self.mover.update(&mut self.pose, intent, frame.dt);

        let dance = self.character_keys.wants_dance(input);
        self.playback
            .update(frame.time, intent.is_moving(), dance, frame.dt);

        super::drive_fly_camera(&self.fly, &self.camera_keys, &mut self.camera, input, frame.dt);
        Flow::Continue
    }

    fn lighting(&self, _frame: FrameInfo) -> SceneLighting {
        SceneLighting::ambient_directional(KEY_LIGHT_DIR)
    }

    fn draw(&self, _frame: FrameInfo, list: &mut DrawList) {
        let floor_y = self.config.player.start.y;
        list.push(DrawItem::lit(
            self.cube,
            Mat4::from_translation(Vec3::new(0.0, floor_y - 0.025, 0.0))
                * Mat4::from_scale(Vec3::new(20.0, 0.05, 20.0)),
            FLOOR_COLOR,
        ));

        let rotation = Mat4::from_rotation_y(self.pose.heading);
        let roots: Vec<bool> = self
            .playback
            .clips()
            .skeleton()
            .joints()
            .iter()
            .map(|joint| joint.parent.is_none())
            .collect();
        for (i, position) in self.joint_positions().into_iter().enumerate() {
            let color = if roots.get(i).copied().unwrap_or(false) {
                ROOT_COLOR
            } else {
                JOINT_COLOR
            };
            list.push(DrawItem::lit(
                self.cube,
                Mat4::from_translation(position) * rotation * Mat4::from_scale(Vec3::splat(JOINT_SIZE)),
                color,
            ));
        }
    }

    fn hud(&self) -> Hud {
        let animator = self.playback.animator();
        Hud {
            heading: "Dancer".into(),
            lines: vec![
                format!("State: {}", self.playback.state_label()),
                format!(
                    "Clip: {} ({:.2}/{:.2}s)",
                    animator.current().name,
                    animator.elapsed(),
                    animator.current().duration
                ),
                format!("Joints: {}", animator.current().skeleton.len()),
            ],
            banner: None,
            controls: vec![
                ("WASD", "walk / turn"),
                ("E", "dance"),
                ("Arrows", "move camera"),
                ("Click + mouse", "look"),
                ("Esc", "quit"),
            ],
        }
    }
}
