use crate::config::{AssetPaths, SculptureConfig, WindowConfig};
use crate::controller::{
    Demo, DrawItem, DrawList, FlyCameraController, Flow, FrameInfo, Hud, InputProcessor, InputState, KeyBindings,
    SceneAssets,
};
use crate::model::light::sculpture_lights;
use crate::model::{Camera, LightSource, SceneLighting, Sculpture};
use crate::utils::{create_cube_mesh, MeshId};
use crate::view::assets::load_texture_or_white;

/// Kinetic sculpture: textured cubes on a spiral, rings and a wave, lit by orbiting lights.
pub struct SculptureDemo {
    config: SculptureConfig,
    sculpture: Sculpture,
    lights: Vec<LightSource>,
    camera: Camera,
    fly: FlyCameraController,
    processor: InputProcessor,
    cube: MeshId,
}

impl SculptureDemo {
    pub fn new(config: SculptureConfig) -> Self {
        let camera = FlyCameraController::spawn(&config.camera, config.window.width, config.window.height);
        let fly = FlyCameraController::from_config(&config.camera);
        Self {
            sculpture: Sculpture::procedural(),
            lights: sculpture_lights(),
            camera,
            fly,
            processor: InputProcessor::new(KeyBindings::wasd()),
            cube: MeshId(0),
            config,
        }
    }

    pub fn sculpture(&self) -> &Sculpture {
        &self.sculpture
    }
}

impl Default for SculptureDemo {
    fn default() -> Self {
        Self::new(SculptureConfig::default())
    }
}

impl Demo for SculptureDemo {
    fn window(&self) -> &WindowConfig {
        &self.config.window
    }

    fn load(&mut self, paths: &AssetPaths) -> SceneAssets {
        let mut assets = SceneAssets {
            texture: Some(load_texture_or_white(paths.resolve(&self.config.texture))),
            ..SceneAssets::default()
        };
        self.cube = assets.add_mesh(create_cube_mesh());
        tracing::info!(
            instances = self.sculpture.len(),
            lights = self.lights.len(),
            "sculpture ready"
        );
        assets
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    fn update(&mut self, frame: FrameInfo, input: &mut InputState) -> Flow {
        super::drive_fly_camera(&self.fly, &self.processor, &mut self.camera, input, frame.dt);
        Flow::Continue
    }

    fn lighting(&self, frame: FrameInfo) -> SceneLighting {
        SceneLighting::sculpture(&self.lights, frame.time, self.camera.eye, self.camera.forward())
    }

    fn draw(&self, frame: FrameInfo, list: &mut DrawList) {
        let t = frame.time;
        for (model, color) in self.sculpture.frame(t) {
            list.push(DrawItem::lit(self.cube, model, color).textured());
        }
        for (i, light) in self.lights.iter().enumerate() {
            list.push(DrawItem::unlit(self.cube, light.marker_matrix(i, t), light.color));
        }
    }

    fn hud(&self) -> Hud {
        let eye = self.camera.eye;
        Hud {
            heading: "Kinetic Sculpture".into(),
            lines: vec![
                format!("Instances: {}", self.sculpture.len()),
                format!("Lights: {}", self.lights.len()),
                format!("Camera: {:.1}, {:.1}, {:.1}", eye.x, eye.y, eye.z),
                format!("Zoom: {:.0}°", self.camera.fov_y.to_degrees()),
            ],
            banner: None,
            controls: vec![
                ("WASD", "fly"),
                ("Click", "capture mouse"),
                ("Mouse", "look"),
                ("Wheel", "zoom"),
                ("Esc", "quit"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: f32) -> FrameInfo {
        FrameInfo { dt: 0.016, time }
    }

    #[test]
    fn draws_every_instance_and_light_marker() {
        let mut demo = SculptureDemo::default();
        let assets = demo.load(&AssetPaths::new("does-not-exist"));
        assert_eq!(assets.meshes.len(), 1);
        assert!(assets.texture.is_some());

        let mut list = DrawList::default();
        demo.draw(frame(1.0), &mut list);
        assert_eq!(list.len(), demo.sculpture().len() + 6);
        assert_eq!(list.items.iter().filter(|item| !item.lit).count(), 6);
        assert!(list.items.iter().filter(|item| item.lit).all(|item| item.textured));
    }

    #[test]
    fn spotlight_follows_camera() {
        let demo = SculptureDemo::default();
        let lighting = demo.lighting(frame(0.5));
        let spot = lighting.spot.unwrap();
        assert_eq!(spot.position, demo.camera().eye);
        assert_eq!(lighting.points.len(), 4);
    }

    #[test]
    fn keyboard_flies_the_camera() {
        use crate::controller::InputEvent;
        use winit::keyboard::KeyCode;

        let mut demo = SculptureDemo::default();
        let start = demo.camera().eye;
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyW));
        assert_eq!(demo.update(FrameInfo { dt: 0.1, time: 0.1 }, &mut input), Flow::Continue);
        // default view looks down -Z
        assert!(demo.camera().eye.z < start.z);
    }
}
