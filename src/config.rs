use std::env;
use std::path::{Path, PathBuf};

use glam::Vec3;

const DEFAULT_ASSET_DIR: &str = "assets";

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f64; 3],
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, clear_color: [f64; 3]) -> Self {
        Self {
            title: title.into(),
            clear_color,
            ..Self::default()
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "diorama".to_string(),
            width: 1280,
            height: 720,
            clear_color: [0.1, 0.1, 0.12],
        }
    }
}

/// Resolves asset paths relative to `DIORAMA_ASSET_DIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = env::var("DIORAMA_ASSET_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_ASSET_DIR.to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing candidate among `root/rel`, `../root/rel` and `../../root/rel`.
    /// Falls back to `root/rel` with a warning.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        let direct = self.root.join(rel.as_ref());
        if direct.is_absolute() {
            return direct;
        }
        let candidates = [
            direct.clone(),
            Path::new("..").join(&direct),
            Path::new("../..").join(&direct),
        ];
        if let Some(found) = candidates.iter().find(|p| p.exists()) {
            return found.clone();
        }
        tracing::warn!(path = %direct.display(), "asset not found in any search location");
        direct
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_DIR)
    }
}

/// Tank-style movement of a ground entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
    pub half_extents: Vec3,
    pub start: Vec3,
    pub start_heading: f32,
}

impl PlayerConfig {
    pub fn fetch() -> Self {
        Self::default()
    }

    pub fn dancer() -> Self {
        Self {
            move_speed: 2.0,
            turn_speed: 2.0,
            half_extents: Vec3::new(0.3, 0.9, 0.3),
            start: Vec3::new(0.0, -0.5, 0.0),
            start_heading: 0.0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            turn_speed: 45f32.to_radians(),
            half_extents: Vec3::new(0.5, 0.4, 0.8),
            start: Vec3::new(0.0, 0.5, 0.0),
            start_heading: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCameraConfig {
    pub back_distance: f32,
    pub height: f32,
}

impl Default for FollowCameraConfig {
    fn default() -> Self {
        Self {
            back_distance: 8.0,
            height: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCameraConfig {
    pub start: Vec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    /// Initial vertical field of view in degrees.
    pub zoom: f32,
}

impl Default for FlyCameraConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            move_speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SculptureConfig {
    pub window: WindowConfig,
    pub camera: FlyCameraConfig,
    pub texture: PathBuf,
}

impl Default for SculptureConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::new("Kinetic Sculpture", [0.02, 0.02, 0.06]),
            camera: FlyCameraConfig {
                start: Vec3::new(0.0, 8.0, 15.0),
                move_speed: 5.0,
                ..FlyCameraConfig::default()
            },
            texture: PathBuf::from("textures/diffuse.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub camera: FollowCameraConfig,
    pub pickup_count: usize,
    pub pickup_half_extents: Vec3,
    pub obstacle_position: Vec3,
    pub obstacle_half_extents: Vec3,
    /// Radians per second while the spin key is held.
    pub spin_speed: f32,
    pub light_position: Vec3,
    pub player_model: PathBuf,
    pub pickup_model: PathBuf,
    pub obstacle_model: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::new("Bones: 0/10", [0.1, 0.1, 0.12]),
            player: PlayerConfig::fetch(),
            camera: FollowCameraConfig::default(),
            pickup_count: 10,
            pickup_half_extents: Vec3::splat(0.3),
            obstacle_position: Vec3::new(5.0, 0.0, -3.0),
            obstacle_half_extents: Vec3::new(0.6, 1.0, 0.6),
            spin_speed: 240f32.to_radians(),
            light_position: Vec3::new(10.0, 10.0, 10.0),
            player_model: PathBuf::from("models/dog.glb"),
            pickup_model: PathBuf::from("models/bone.glb"),
            obstacle_model: PathBuf::from("models/trash_can.glb"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DancerConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub camera: FlyCameraConfig,
    pub model_scale: f32,
    pub idle_clip: PathBuf,
    pub walk_clip: PathBuf,
    pub dance_clip: PathBuf,
}

impl Default for DancerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::new("Dancer", [0.05, 0.05, 0.08]),
            player: PlayerConfig::dancer(),
            camera: FlyCameraConfig {
                start: Vec3::new(0.0, 1.0, 5.0),
                ..FlyCameraConfig::default()
            },
            model_scale: 0.5,
            idle_clip: PathBuf::from("animations/idle.glb"),
            walk_clip: PathBuf::from("animations/walk.glb"),
            dance_clip: PathBuf::from("animations/dance.glb"),
        }
    }
}
